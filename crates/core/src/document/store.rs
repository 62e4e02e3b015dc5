//! Filesystem-backed document store using Apache OpenDAL.

use chrono::Utc;
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::config::{DocumentStoreConfig, normalize_extension};
use super::error::DocumentError;

/// Kind of stored document; selects the sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Generated summary PDF.
    SummaryPdf,
    /// Signed scan uploaded by a planner.
    Signed,
    /// Spreadsheet as originally uploaded.
    Source,
}

impl DocumentKind {
    /// Sub-directory under the store root.
    #[must_use]
    pub const fn dir(&self) -> &'static str {
        match self {
            Self::SummaryPdf => "pdf",
            Self::Signed => "signed",
            Self::Source => "source",
        }
    }

    /// Short name used in API responses and errors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SummaryPdf => "pdf",
            Self::Signed => "signed",
            Self::Source => "source",
        }
    }
}

/// Extensions kept as uploaded spreadsheets.
const SOURCE_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods", "csv"];

/// Document store for summary PDFs, signed scans and uploaded spreadsheets.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    operator: Operator,
    config: DocumentStoreConfig,
}

impl DocumentStore {
    /// Create a document store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem service cannot be initialized.
    pub fn from_config(config: DocumentStoreConfig) -> Result<Self, DocumentError> {
        let root = config
            .root
            .to_str()
            .ok_or_else(|| DocumentError::Configuration("root is not valid UTF-8".into()))?;

        let operator = Operator::new(services::Fs::default().root(root))
            .map_err(|e| DocumentError::Configuration(e.to_string()))?
            .finish();

        Ok(Self { operator, config })
    }

    /// Check extension and size for a document of `kind`.
    ///
    /// Spreadsheets are bounded by the import limit instead of the document
    /// limit. Returns the normalized extension.
    pub fn validate(
        &self,
        kind: DocumentKind,
        declared_extension: &str,
        size: u64,
    ) -> Result<String, DocumentError> {
        let extension = normalize_extension(declared_extension);

        let accepted = match kind {
            DocumentKind::SummaryPdf => extension == "pdf",
            DocumentKind::Signed => self.config.is_extension_allowed(&extension),
            DocumentKind::Source => SOURCE_EXTENSIONS.contains(&extension.as_str()),
        };
        if !accepted {
            return Err(DocumentError::UnsupportedFileType { extension });
        }

        if kind != DocumentKind::Source && size > self.config.max_document_bytes {
            return Err(DocumentError::DocumentTooLarge {
                size,
                max: self.config.max_document_bytes,
            });
        }

        Ok(extension)
    }

    /// Relative path for a new document.
    ///
    /// Format: `{kind}/{file_id}/{timestamp}_{nonce}_{actor}.{ext}`. The
    /// nonce keeps writes in the same millisecond apart.
    #[must_use]
    pub fn document_path(kind: DocumentKind, file_id: Uuid, actor: &str, extension: &str) -> String {
        format!(
            "{}/{}/{}_{}_{}.{}",
            kind.dir(),
            file_id,
            Utc::now().format("%Y%m%dT%H%M%S%3f"),
            Uuid::now_v7().simple(),
            sanitize_segment(actor),
            extension
        )
    }

    /// Validate and write a document, returning its relative path.
    pub async fn store(
        &self,
        file_id: Uuid,
        actor: &str,
        bytes: Vec<u8>,
        declared_extension: &str,
        kind: DocumentKind,
    ) -> Result<String, DocumentError> {
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        let extension = self.validate(kind, declared_extension, size)?;
        let path = Self::document_path(kind, file_id, actor, &extension);

        self.operator
            .write(&path, bytes)
            .await
            .map_err(|e| DocumentError::from_opendal(&path, &e))?;

        Ok(path)
    }

    /// Read a stored document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::OrphanedReference` if nothing exists at `path`.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>, DocumentError> {
        self.operator
            .read(path)
            .await
            .map(|buffer| buffer.to_vec())
            .map_err(|e| DocumentError::from_opendal(path, &e))
    }

    /// Check whether a document exists.
    pub async fn exists(&self, path: &str) -> Result<bool, DocumentError> {
        match self.operator.stat(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DocumentError::Operation(e.to_string())),
        }
    }

    /// Delete a document. Deleting a missing document is not an error.
    pub async fn delete(&self, path: &str) -> Result<(), DocumentError> {
        self.operator
            .delete(path)
            .await
            .map_err(|e| DocumentError::Operation(e.to_string()))
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &DocumentStoreConfig {
        &self.config
    }
}

/// Keep only ASCII alphanumerics, dots, hyphens, and underscores.
fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
