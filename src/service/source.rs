use std::future::Future;

use tokio::fs as async_fs;
use tracing::debug;

use super::locator::Locator;
use crate::error::{FloorError, Result};

/// Resolves a locator into encoded image bytes
pub trait ImageSource: Send + Sync {
    fn fetch(&self, locator: &Locator) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads `file://` locators from the local filesystem.
///
/// Network schemes are rejected with a fetch error; a serving layer that
/// needs them supplies its own [`ImageSource`].
#[derive(Debug, Clone, Default)]
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    async fn fetch(&self, locator: &Locator) -> Result<Vec<u8>> {
        let Some(path) = locator.file_path() else {
            return Err(FloorError::Fetch(format!(
                "no {} client configured for {}",
                locator.scheme().as_str(),
                locator
            )));
        };

        let bytes = async_fs::read(&path)
            .await
            .map_err(|e| FloorError::Fetch(format!("failed to read {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), bytes = bytes.len(), "read source image");
        Ok(bytes)
    }
}
