//! Document store for generated summary PDFs, signed scans and the
//! spreadsheets they were built from.
//!
//! Binary content lives on the filesystem (through Apache OpenDAL) under a
//! configured root; the database only ever holds the relative path.
//!
//! ```text
//! {root}/
//! ├── pdf/{file_id}/{timestamp}_{nonce}_{actor}.pdf
//! ├── signed/{file_id}/{timestamp}_{nonce}_{actor}.{pdf|jpg|jpeg|png}
//! └── source/{file_id}/{timestamp}_{nonce}_{actor}.{xlsx|xls|ods|csv}
//! ```

mod config;
mod error;
mod store;
pub mod summary;

pub use config::DocumentStoreConfig;
pub use error::DocumentError;
pub use store::{DocumentKind, DocumentStore};
pub use summary::{SummaryDocument, SummaryLine, render_summary_pdf};
