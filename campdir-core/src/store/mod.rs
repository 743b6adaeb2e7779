pub mod collection;
pub mod store;

pub use collection::*;
pub use store::*;
