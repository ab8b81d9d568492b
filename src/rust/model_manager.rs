use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_name}")]
    HashMismatch {
        file_name: String,
        expected: String,
        actual: String,
    },
}

/// Fetches remote model files into a local cache and verifies them.
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("SIGN_CLASSIFIER_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("signsight").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("signsight").join("models");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("signsight").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Local path a model downloaded from `url` is cached under.
    ///
    /// The last non-empty path segment (query string stripped) names the file.
    pub fn get_model_path(&self, url: &str) -> PathBuf {
        let without_query = url.split(['?', '#']).next().unwrap_or(url);
        let file_name = without_query
            .rsplit('/')
            .find(|segment| !segment.is_empty() && !segment.contains(':'))
            .unwrap_or("model.onnx");
        self.models_dir.join(file_name)
    }

    pub fn is_model_downloaded(&self, url: &str) -> bool {
        let model_path = self.get_model_path(url);
        log::info!("Model path: {:?} (exists: {})", model_path, model_path.exists());
        model_path.exists()
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ModelError> {
        log::info!("Verifying file: {:?}", path);
        let bytes = fs::read(path)?;
        log::info!("Read {} bytes", bytes.len());
        let hash = sha256_hex(&bytes);
        log::info!("Calculated hash: {}", hash);
        log::info!("Expected hash:   {}", expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash))
    }

    /// Checks a cached model against its expected hash.
    /// Returns `Ok(false)` when the file is missing or does not match.
    pub fn verify_model(&self, url: &str, expected_hash: &str) -> Result<bool, ModelError> {
        let model_path = self.get_model_path(url);
        if !model_path.exists() {
            log::info!("Model file {:?} does not exist", model_path);
            return Ok(false);
        }
        self.verify_file(&model_path, expected_hash)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
    ) -> Result<(), ModelError> {
        log::info!("Downloading model from {} to {:?}", url, path);
        let response = reqwest::get(url).await?.error_for_status()?;
        log::info!("Download response status: {}", response.status());
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected_hash) = expected_hash {
            let hash = sha256_hex(&bytes);
            log::info!("Calculated hash: {}", hash);

            if !hash.eq_ignore_ascii_case(expected_hash) {
                log::error!("Model hash mismatch: expected {}, got {}", expected_hash, hash);
                return Err(ModelError::HashMismatch {
                    file_name: path.display().to_string(),
                    expected: expected_hash.to_string(),
                    actual: hash,
                });
            }
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        log::info!("Writing {} bytes to {:?}", bytes.len(), path);
        fs::write(path, &bytes)?;

        if let Some(expected_hash) = expected_hash {
            if !self.verify_file(path, expected_hash)? {
                return Err(ModelError::VerificationFailed);
            }
        }

        log::info!("Model downloaded successfully");
        Ok(())
    }

    pub fn remove_download(&self, url: &str) -> Result<(), ModelError> {
        let model_path = self.get_model_path(url);
        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        Ok(())
    }

    /// Ensures the model at `url` is present in the cache and returns its local path.
    ///
    /// A cached file is reused as-is when no hash is given. With a hash, the
    /// cached file is verified and re-downloaded on mismatch.
    pub async fn ensure_model(&self, url: &str, expected_hash: Option<&str>) -> Result<PathBuf, ModelError> {
        let _lock = self.download_lock.lock().await;
        let model_path = self.get_model_path(url);

        let cached_ok = match (model_path.exists(), expected_hash) {
            (false, _) => false,
            (true, None) => true,
            (true, Some(hash)) => self.verify_file(&model_path, hash)?,
        };

        if cached_ok {
            log::info!("Using cached model at {:?}", model_path);
            return Ok(model_path);
        }

        if model_path.exists() {
            log::warn!("Cached model failed verification, re-downloading");
            self.remove_download(url)?;
        }

        if let Err(e) = self.download_and_verify_file(url, &model_path, expected_hash).await {
            log::error!("Failed to fetch model: {}", e);
            // Cleanup on failure
            let _ = self.remove_download(url);
            return Err(e);
        }

        Ok(model_path)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.invalid/models/gtsrb.onnx?download=1";
    fn expected_hash() -> String {
        sha256_hex(b"cached model bytes")
    }

    fn manager(name: &str) -> ModelManager {
        let dir = env::temp_dir().join("signsight-test").join(name);
        let _ = fs::remove_dir_all(&dir);
        ModelManager::new(dir).unwrap()
    }

    #[test]
    fn test_model_path_from_url() {
        let manager = manager("paths");
        assert!(manager.get_model_path(URL).ends_with("gtsrb.onnx"));
        assert!(manager.get_model_path("https://host/a/b/net.onnx/").ends_with("net.onnx"));
        assert!(manager.get_model_path("https://host").ends_with("host"));
    }

    #[test]
    fn test_verify_model() -> Result<(), ModelError> {
        let manager = manager("verify");
        assert!(!manager.verify_model(URL, &expected_hash())?);

        fs::write(manager.get_model_path(URL), b"cached model bytes")?;
        assert!(manager.is_model_downloaded(URL));
        assert!(manager.verify_model(URL, &expected_hash())?);
        assert!(manager.verify_model(URL, &expected_hash().to_uppercase())?);

        // Corrupt file and verify
        fs::write(manager.get_model_path(URL), b"corrupted data")?;
        assert!(!manager.verify_model(URL, &expected_hash())?);

        manager.remove_download(URL)?;
        assert!(!manager.is_model_downloaded(URL));
        Ok(())
    }

    #[test]
    fn test_ensure_model_uses_cache() -> Result<(), ModelError> {
        let manager = manager("cache");
        fs::write(manager.get_model_path(URL), b"cached model bytes")?;

        let hash = expected_hash();
        let path = tokio_test::block_on(manager.ensure_model(URL, Some(&hash)))?;
        assert_eq!(path, manager.get_model_path(URL));

        let path = tokio_test::block_on(manager.ensure_model(URL, None))?;
        assert_eq!(fs::read(path)?, b"cached model bytes");
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_model_download_failure_cleans_up() {
        let manager = manager("failure");
        let url = "http://127.0.0.1:9/missing.onnx";

        let result = manager.ensure_model(url, None).await;
        assert!(matches!(result, Err(ModelError::DownloadError(_))));
        assert!(!manager.is_model_downloaded(url));
    }

    #[test]
    fn test_default_models_dir() {
        // Test with environment variable
        env::set_var("SIGN_CLASSIFIER_CACHE", "/tmp/test-cache");
        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("/tmp/test-cache/models"));
        env::remove_var("SIGN_CLASSIFIER_CACHE");

        // Test without environment variable
        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("signsight/models"));
    }
}
