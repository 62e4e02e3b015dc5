//! Workflow repository for budget file state transitions.
//!
//! Each transition reads the file, validates it through
//! [`WorkflowService`], and then applies the resulting [`WorkflowAction`]
//! with a single `UPDATE ... WHERE id = ? AND version = ?`. A lost race is
//! reported as [`WorkflowError::ConcurrentModification`] and never applied.

use bap_core::auth::Actor;
use bap_core::document::{
    DocumentError, DocumentKind, DocumentStore, SummaryDocument, SummaryLine, render_summary_pdf,
};
use bap_core::import::{Channel, NormalizedSheet, spreadsheet_extension};
use bap_core::workflow::{WorkflowAction, WorkflowError, WorkflowService};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveEnum, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{budget_files, sea_orm_active_enums::BudgetStatus};

use super::budget_file::{
    BudgetFileRepository, FileWithItems, NewBudgetFile, load_items, username_of,
};

/// Bytes of a stored document together with its relative path.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Path relative to the store root.
    pub path: String,
    /// Document content.
    pub bytes: Vec<u8>,
}

/// Workflow repository for budget file state transitions.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
    documents: DocumentStore,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, documents: DocumentStore) -> Self {
        Self { db, documents }
    }

    /// Enters a parsed spreadsheet into the workflow.
    ///
    /// The uploaded bytes are stored first so the manager can review the
    /// original; they are removed again if the file cannot be created.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not upload, the spreadsheet cannot
    /// be stored, or the insert fails.
    pub async fn submit(
        &self,
        actor: &Actor,
        filename: &str,
        channel: Channel,
        sheet: &NormalizedSheet,
        source: Vec<u8>,
    ) -> Result<FileWithItems, WorkflowError> {
        WorkflowService::authorize_upload(actor.role)?;

        let file_id = Uuid::new_v4();
        let source_path = self
            .documents
            .store(
                file_id,
                &actor.username,
                source,
                &spreadsheet_extension(filename),
                DocumentKind::Source,
            )
            .await?;

        let created = BudgetFileRepository::new(self.db.clone())
            .create_with_items(NewBudgetFile {
                id: file_id,
                filename,
                channel,
                uploader_id: actor.id,
                sheet,
                source_path: Some(&source_path),
            })
            .await;

        match created {
            Ok(file) => Ok(file),
            Err(e) => {
                if let Err(cleanup) = self.documents.delete(&source_path).await {
                    tracing::warn!(path = %source_path, error = %cleanup, "failed to remove unreferenced document");
                }
                Err(WorkflowError::Database(e.to_string()))
            }
        }
    }

    /// Approves a pending file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File is not found
    /// - Actor is not a manager or admin, or the file is not pending
    /// - The file changed concurrently
    /// - Database operation fails
    pub async fn approve(
        &self,
        file_id: Uuid,
        actor: &Actor,
    ) -> Result<budget_files::Model, WorkflowError> {
        let file = self.fetch(file_id).await?;
        let action = WorkflowService::approve(file.status.into(), actor)?;
        self.apply(&file, &action, None).await
    }

    /// Rejects a pending file with a reason.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File is not found
    /// - Actor is not a manager or admin, the file is not pending, or the reason is blank
    /// - The file changed concurrently
    /// - Database operation fails
    pub async fn reject(
        &self,
        file_id: Uuid,
        actor: &Actor,
        reason: &str,
    ) -> Result<budget_files::Model, WorkflowError> {
        let file = self.fetch(file_id).await?;
        let action = WorkflowService::reject(file.status.into(), actor, reason)?;
        self.apply(&file, &action, None).await
    }

    /// Renders and stores the summary PDF, moving the file to signing.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, the document cannot be
    /// written, or the file changed concurrently (the new PDF is then removed).
    pub async fn generate_pdf(
        &self,
        file_id: Uuid,
        actor: &Actor,
    ) -> Result<budget_files::Model, WorkflowError> {
        let file = self.fetch(file_id).await?;
        let action = WorkflowService::generate_pdf(file.status.into(), actor)?;

        let summary = self.summary_of(&file).await?;
        let pdf = render_summary_pdf(&summary);
        let path = self
            .documents
            .store(file.id, &actor.username, pdf, "pdf", DocumentKind::SummaryPdf)
            .await?;

        self.apply_with_document(&file, &action, path).await
    }

    /// Stores a signed scan for a file in signing.
    ///
    /// May be repeated; the latest scan replaces the reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, the extension or size is
    /// rejected, or the file changed concurrently (the new scan is then removed).
    pub async fn upload_signed(
        &self,
        file_id: Uuid,
        actor: &Actor,
        bytes: Vec<u8>,
        declared_extension: &str,
    ) -> Result<budget_files::Model, WorkflowError> {
        let file = self.fetch(file_id).await?;
        let action = WorkflowService::upload_signed(file.status.into(), actor)?;

        let path = self
            .documents
            .store(
                file.id,
                &actor.username,
                bytes,
                declared_extension,
                DocumentKind::Signed,
            )
            .await?;

        self.apply_with_document(&file, &action, path).await
    }

    /// Finalizes a signed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid (including no signed
    /// scan), the referenced scan is missing from storage, or the file
    /// changed concurrently.
    pub async fn finalize(
        &self,
        file_id: Uuid,
        actor: &Actor,
    ) -> Result<budget_files::Model, WorkflowError> {
        let file = self.fetch(file_id).await?;
        let action = WorkflowService::finalize(
            file.status.into(),
            actor,
            file.signed_file_path.is_some(),
        )?;

        if let Some(path) = &file.signed_file_path
            && !self.documents.exists(path).await?
        {
            return Err(DocumentError::OrphanedReference { path: path.clone() }.into());
        }

        self.apply(&file, &action, None).await
    }

    /// Reads the summary PDF of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file has no PDF or its bytes are missing.
    pub async fn read_pdf(&self, file_id: Uuid) -> Result<StoredDocument, WorkflowError> {
        let file = self.fetch(file_id).await?;
        self.read_document(file.id, file.pdf_file_path, DocumentKind::SummaryPdf)
            .await
    }

    /// Reads the signed scan of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file has no signed scan or its bytes are missing.
    pub async fn read_signed(&self, file_id: Uuid) -> Result<StoredDocument, WorkflowError> {
        let file = self.fetch(file_id).await?;
        self.read_document(file.id, file.signed_file_path, DocumentKind::Signed)
            .await
    }

    /// Reads the spreadsheet a file was created from.
    ///
    /// # Errors
    ///
    /// Returns an error if the file predates stored spreadsheets or its bytes
    /// are missing.
    pub async fn read_source(&self, file_id: Uuid) -> Result<StoredDocument, WorkflowError> {
        let file = self.fetch(file_id).await?;
        self.read_document(file.id, file.source_file_path, DocumentKind::Source)
            .await
    }

    async fn read_document(
        &self,
        file_id: Uuid,
        path: Option<String>,
        kind: DocumentKind,
    ) -> Result<StoredDocument, WorkflowError> {
        let path = path.ok_or(WorkflowError::NoDocument {
            file_id,
            kind: kind.label(),
        })?;
        let bytes = self.documents.read(&path).await.inspect_err(|e| {
            tracing::error!(file_id = %file_id, path = %path, error = %e, "stored document unreadable");
        })?;
        Ok(StoredDocument { path, bytes })
    }

    async fn fetch(&self, file_id: Uuid) -> Result<budget_files::Model, WorkflowError> {
        budget_files::Entity::find_by_id(file_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::FileNotFound(file_id))
    }

    async fn summary_of(&self, file: &budget_files::Model) -> Result<SummaryDocument, WorkflowError> {
        let db_err = |e: sea_orm::DbErr| WorkflowError::Database(e.to_string());

        let items = load_items(&self.db, file.id).await.map_err(db_err)?;
        let uploaded_by = username_of(&self.db, file.uploader_id)
            .await
            .map_err(db_err)?
            .unwrap_or_default();
        let approved_by = match file.reviewer_id {
            Some(id) => username_of(&self.db, id).await.map_err(db_err)?,
            None => None,
        };

        Ok(SummaryDocument {
            filename: file.filename.clone(),
            channel: file.channel.to_value(),
            uploaded_by,
            uploaded_at: file.uploaded_at.to_utc(),
            approved_by,
            approved_at: file.reviewed_at.map(|t| t.to_utc()),
            total_amount: file.total_amount,
            lines: items
                .into_iter()
                .map(|item| SummaryLine {
                    row_number: item.row_number,
                    budget_code: item.budget_code,
                    campaign_name: item.campaign_name,
                    vendor: item.vendor,
                    amount_planned: item.amount_planned,
                })
                .collect(),
        })
    }

    /// Applies an action that references a just-written document, removing
    /// the document again if the update does not land.
    async fn apply_with_document(
        &self,
        file: &budget_files::Model,
        action: &WorkflowAction,
        path: String,
    ) -> Result<budget_files::Model, WorkflowError> {
        match self.apply(file, action, Some(&path)).await {
            Ok(updated) => Ok(updated),
            Err(err) => {
                if let Err(cleanup) = self.documents.delete(&path).await {
                    tracing::warn!(path = %path, error = %cleanup, "failed to remove unreferenced document");
                }
                Err(err)
            }
        }
    }

    /// Conditional update guarded by the version read in `file`.
    async fn apply(
        &self,
        file: &budget_files::Model,
        action: &WorkflowAction,
        document_path: Option<&str>,
    ) -> Result<budget_files::Model, WorkflowError> {
        use budget_files::Column;

        let new_status = BudgetStatus::from(action.new_status());
        let mut update = budget_files::Entity::update_many()
            .col_expr(Column::Status, Expr::value(new_status.to_value()))
            .col_expr(Column::Version, Expr::col(Column::Version).add(1));

        update = match action {
            WorkflowAction::Approve {
                reviewer_id,
                reviewed_at,
                ..
            } => update
                .col_expr(Column::ReviewerId, Expr::value(*reviewer_id))
                .col_expr(Column::ReviewedAt, Expr::value(reviewed_at.fixed_offset())),
            WorkflowAction::Reject {
                reviewer_id,
                reviewed_at,
                reason,
                ..
            } => update
                .col_expr(Column::ReviewerId, Expr::value(*reviewer_id))
                .col_expr(Column::ReviewedAt, Expr::value(reviewed_at.fixed_offset()))
                .col_expr(Column::ReviewerComment, Expr::value(reason.clone())),
            WorkflowAction::GeneratePdf { generated_at, .. } => update
                .col_expr(Column::PdfGeneratedAt, Expr::value(generated_at.fixed_offset()))
                .col_expr(
                    Column::PdfFilePath,
                    Expr::value(document_path.map(str::to_string)),
                ),
            WorkflowAction::UploadSigned { uploaded_at, .. } => update
                .col_expr(Column::SignedUploadedAt, Expr::value(uploaded_at.fixed_offset()))
                .col_expr(
                    Column::SignedFilePath,
                    Expr::value(document_path.map(str::to_string)),
                ),
            WorkflowAction::Finalize { finalized_at, .. } => {
                update.col_expr(Column::FinalizedAt, Expr::value(finalized_at.fixed_offset()))
            }
        };

        let result = update
            .filter(Column::Id.eq(file.id))
            .filter(Column::Version.eq(file.version))
            .exec(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        if result.rows_affected != 1 {
            tracing::warn!(
                file_id = %file.id,
                transition = %action.transition(),
                version = file.version,
                "transition lost a concurrent update"
            );
            return Err(WorkflowError::ConcurrentModification { file_id: file.id });
        }

        tracing::info!(
            file_id = %file.id,
            transition = %action.transition(),
            status = %action.new_status(),
            "budget file transition applied"
        );

        self.fetch(file.id).await
    }
}
