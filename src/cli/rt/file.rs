use anyhow::anyhow;
use campdir_core::FileIO;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[derive(Default, Clone)]
pub struct NativeFileIO {}

#[async_trait::async_trait]
impl FileIO for NativeFileIO {
    async fn write<'a>(&'a self, path: &'a str, content: &'a [u8]) -> anyhow::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(content)
            .await
            .map_err(|e| anyhow!("{}", e))?;
        log::info!("File write: {} ... ok", path);
        Ok(())
    }

    async fn read<'a>(&'a self, path: &'a str) -> anyhow::Result<String> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .await
            .map_err(|e| anyhow!("{}", e))?;
        log::info!("File read: {} ... ok", path);
        Ok(String::from_utf8(buffer)?)
    }

    async fn create_dirs<'a>(&'a self, path: &'a str) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let path = path.to_str().unwrap();

        let io = NativeFileIO::default();
        io.write(path, b"hello").await.unwrap();
        assert_eq!(io.read(path).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_create_dirs_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        let io = NativeFileIO::default();
        io.create_dirs(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
