//! Document store configuration.

use std::path::PathBuf;

use bap_shared::config::StorageSettings;

/// Document store configuration.
#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Root directory for all stored documents.
    pub root: PathBuf,
    /// Largest document accepted, in bytes.
    pub max_document_bytes: u64,
    /// Lower-case extensions (without the dot) accepted for signed scans.
    pub allowed_extensions: Vec<String>,
}

impl DocumentStoreConfig {
    /// Default max document size: 20MB.
    pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 20 * 1024 * 1024;

    /// Create a config rooted at `root` with default limits.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_document_bytes: Self::DEFAULT_MAX_DOCUMENT_BYTES,
            allowed_extensions: Self::default_extensions(),
        }
    }

    /// Set maximum document size.
    #[must_use]
    pub fn with_max_document_bytes(mut self, size: u64) -> Self {
        self.max_document_bytes = size;
        self
    }

    /// Extensions accepted for signed scans.
    #[must_use]
    pub fn default_extensions() -> Vec<String> {
        ["pdf", "jpg", "jpeg", "png"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Check an extension against the allow-list, ignoring case and a leading dot.
    #[must_use]
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let ext = normalize_extension(extension);
        self.allowed_extensions.iter().any(|e| *e == ext)
    }
}

impl From<&StorageSettings> for DocumentStoreConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self::new(settings.root.clone()).with_max_document_bytes(settings.max_document_bytes)
    }
}

/// Lower-cases an extension and strips surrounding whitespace and a leading dot.
pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}
