pub mod error;
pub mod request_handler;
pub mod response;
