mod http1;
#[allow(clippy::module_inception)]
mod server;
mod server_config;

pub use server::Server;
