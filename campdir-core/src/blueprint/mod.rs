pub mod blueprint;

pub use blueprint::*;
