pub mod bootcamp;
pub mod course;
pub mod review;
pub mod user;

pub use bootcamp::*;
pub use course::*;
pub use review::*;
pub use user::*;

/// Collects field-level validation failures into one 400-worthy error.
pub(crate) fn fail_on(problems: Vec<String>) -> anyhow::Result<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(problems.join(", ")))
    }
}
