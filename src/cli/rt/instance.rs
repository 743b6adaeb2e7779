use campdir_core::Instance;
use std::time::SystemTime;

#[derive(Default, Clone)]
pub struct NativeInstance {}

impl Instance for NativeInstance {
    fn now(&self) -> anyhow::Result<u128> {
        Ok(SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)?
            .as_millis())
    }
}
