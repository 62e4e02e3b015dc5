//! Workflow service for budget file state transitions.
//!
//! Every method checks the actor's role first, then the file's status, then
//! any transition-specific precondition. Nothing is mutated here; the caller
//! persists the returned [`WorkflowAction`].

use chrono::Utc;

use crate::auth::{Actor, Role};
use crate::workflow::error::{Violation, WorkflowError};
use crate::workflow::types::{FileStatus, Transition, WorkflowAction};

/// Stateless service for budget file workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Checks that `role` may create a new budget file.
    pub fn authorize_upload(role: Role) -> Result<(), WorkflowError> {
        if role.can_upload() {
            Ok(())
        } else {
            Err(WorkflowError::UploadNotPermitted(role))
        }
    }

    /// Approve a pending file.
    pub fn approve(current: FileStatus, actor: &Actor) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current, Transition::Approve, actor.role)?;
        Ok(WorkflowAction::Approve {
            new_status: Transition::Approve.target(),
            reviewer_id: actor.id,
            reviewed_at: Utc::now(),
        })
    }

    /// Reject a pending file with a non-empty reason.
    pub fn reject(
        current: FileStatus,
        actor: &Actor,
        reason: &str,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current, Transition::Reject, actor.role)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::invalid(
                current,
                Transition::Reject,
                Violation::EmptyReason,
            ));
        }

        Ok(WorkflowAction::Reject {
            new_status: Transition::Reject.target(),
            reviewer_id: actor.id,
            reviewed_at: Utc::now(),
            reason: reason.to_string(),
        })
    }

    /// Move an approved file to signing once its summary PDF exists.
    pub fn generate_pdf(
        current: FileStatus,
        actor: &Actor,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current, Transition::GeneratePdf, actor.role)?;
        Ok(WorkflowAction::GeneratePdf {
            new_status: Transition::GeneratePdf.target(),
            generated_at: Utc::now(),
        })
    }

    /// Attach a signed scan to a file in signing. May be repeated.
    pub fn upload_signed(
        current: FileStatus,
        actor: &Actor,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current, Transition::UploadSigned, actor.role)?;
        Ok(WorkflowAction::UploadSigned {
            new_status: Transition::UploadSigned.target(),
            uploaded_at: Utc::now(),
        })
    }

    /// Finalize a signed file.
    pub fn finalize(
        current: FileStatus,
        actor: &Actor,
        has_signed_document: bool,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(current, Transition::Finalize, actor.role)?;

        if !has_signed_document {
            return Err(WorkflowError::invalid(
                current,
                Transition::Finalize,
                Violation::MissingSignedDocument,
            ));
        }

        Ok(WorkflowAction::Finalize {
            new_status: Transition::Finalize.target(),
            finalized_at: Utc::now(),
        })
    }

    /// Transitions `role` may attempt on a file in `status`.
    #[must_use]
    pub fn permitted_actions(role: Role, status: FileStatus) -> Vec<Transition> {
        Transition::ALL
            .into_iter()
            .filter(|t| t.source() == status && t.allows(role))
            .collect()
    }

    /// Check if a status change is one of the workflow's edges.
    #[must_use]
    pub fn is_valid_transition(from: FileStatus, to: FileStatus) -> bool {
        Transition::ALL
            .iter()
            .any(|t| t.source() == from && t.target() == to)
    }

    fn guard(current: FileStatus, transition: Transition, role: Role) -> Result<(), WorkflowError> {
        if !transition.allows(role) {
            return Err(WorkflowError::invalid(
                current,
                transition,
                Violation::RoleNotPermitted(role),
            ));
        }
        if current != transition.source() {
            return Err(WorkflowError::invalid(
                current,
                transition,
                Violation::WrongStatus,
            ));
        }
        Ok(())
    }
}
