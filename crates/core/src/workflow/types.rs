//! Workflow domain types for the budget file lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::auth::Role;

/// Budget file status in the approval workflow.
///
/// Files move strictly forward:
/// - PendingApproval → ApprovedForPrint (approve)
/// - PendingApproval → Rejected (reject)
/// - ApprovedForPrint → Signing (generate PDF)
/// - Signing → Signing (upload signed scan)
/// - Signing → Finalized (finalize)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    /// Uploaded and waiting for a manager.
    PendingApproval,
    /// Approved; the summary PDF can be generated.
    ApprovedForPrint,
    /// Summary PDF printed; waiting for the signed scan and finalization.
    Signing,
    /// Archived; items are visible on the dashboard.
    Finalized,
    /// Rejected by a manager (terminal).
    Rejected,
}

impl FileStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::PendingApproval,
        Self::ApprovedForPrint,
        Self::Signing,
        Self::Finalized,
        Self::Rejected,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::ApprovedForPrint => "approved_for_print",
            Self::Signing => "signing",
            Self::Finalized => "finalized",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending_approval" => Some(Self::PendingApproval),
            "approved_for_print" => Some(Self::ApprovedForPrint),
            "signing" => Some(Self::Signing),
            "finalized" => Some(Self::Finalized),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if no transition leaves this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Rejected)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named workflow step that can be applied to an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// PendingApproval → ApprovedForPrint.
    Approve,
    /// PendingApproval → Rejected.
    Reject,
    /// ApprovedForPrint → Signing.
    GeneratePdf,
    /// Signing → Signing, attaching the signed scan.
    UploadSigned,
    /// Signing → Finalized.
    Finalize,
}

impl Transition {
    /// Every transition.
    pub const ALL: [Self; 5] = [
        Self::Approve,
        Self::Reject,
        Self::GeneratePdf,
        Self::UploadSigned,
        Self::Finalize,
    ];

    /// Returns the string representation of the transition.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::GeneratePdf => "generate_pdf",
            Self::UploadSigned => "upload_signed",
            Self::Finalize => "finalize",
        }
    }

    /// The only status this transition may start from.
    #[must_use]
    pub const fn source(&self) -> FileStatus {
        match self {
            Self::Approve | Self::Reject => FileStatus::PendingApproval,
            Self::GeneratePdf => FileStatus::ApprovedForPrint,
            Self::UploadSigned | Self::Finalize => FileStatus::Signing,
        }
    }

    /// The status this transition produces.
    #[must_use]
    pub const fn target(&self) -> FileStatus {
        match self {
            Self::Approve => FileStatus::ApprovedForPrint,
            Self::Reject => FileStatus::Rejected,
            Self::GeneratePdf | Self::UploadSigned => FileStatus::Signing,
            Self::Finalize => FileStatus::Finalized,
        }
    }

    /// The non-admin role that owns this transition.
    #[must_use]
    pub const fn required_role(&self) -> Role {
        match self {
            Self::Approve | Self::Reject => Role::Manager,
            Self::GeneratePdf | Self::UploadSigned | Self::Finalize => Role::Planner,
        }
    }

    /// Returns true if `role` may perform this transition. Admin may perform all.
    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        role == Role::Admin || role == self.required_role()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow action representing a validated transition with audit data.
///
/// The persistence layer applies the fields carried here in a single
/// conditional update.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Approve a pending file.
    Approve {
        /// The new status after approval.
        new_status: FileStatus,
        /// The manager who approved.
        reviewer_id: Uuid,
        /// When the file was approved.
        reviewed_at: DateTime<Utc>,
    },
    /// Reject a pending file.
    Reject {
        /// The new status after rejection.
        new_status: FileStatus,
        /// The manager who rejected.
        reviewer_id: Uuid,
        /// When the file was rejected.
        reviewed_at: DateTime<Utc>,
        /// Trimmed, non-empty rejection reason.
        reason: String,
    },
    /// Record the generated summary PDF.
    GeneratePdf {
        /// The new status after generation.
        new_status: FileStatus,
        /// When the PDF was generated.
        generated_at: DateTime<Utc>,
    },
    /// Record the uploaded signed scan.
    UploadSigned {
        /// Status is unchanged (Signing).
        new_status: FileStatus,
        /// When the scan was uploaded.
        uploaded_at: DateTime<Utc>,
    },
    /// Finalize a signed file.
    Finalize {
        /// The new status after finalization.
        new_status: FileStatus,
        /// When the file was finalized.
        finalized_at: DateTime<Utc>,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> FileStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::GeneratePdf { new_status, .. }
            | Self::UploadSigned { new_status, .. }
            | Self::Finalize { new_status, .. } => *new_status,
        }
    }

    /// Returns the transition this action performs.
    #[must_use]
    pub const fn transition(&self) -> Transition {
        match self {
            Self::Approve { .. } => Transition::Approve,
            Self::Reject { .. } => Transition::Reject,
            Self::GeneratePdf { .. } => Transition::GeneratePdf,
            Self::UploadSigned { .. } => Transition::UploadSigned,
            Self::Finalize { .. } => Transition::Finalize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in FileStatus::ALL {
            assert_eq!(FileStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            FileStatus::parse("PENDING_APPROVAL"),
            Some(FileStatus::PendingApproval)
        );
        assert_eq!(FileStatus::parse("draft"), None);
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&FileStatus::ApprovedForPrint).unwrap();
        assert_eq!(json, "\"APPROVED_FOR_PRINT\"");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(FileStatus::Finalized.is_terminal());
        assert!(FileStatus::Rejected.is_terminal());
        assert!(!FileStatus::Signing.is_terminal());
    }

    #[test]
    fn test_transition_edges() {
        assert_eq!(Transition::Approve.source(), FileStatus::PendingApproval);
        assert_eq!(Transition::Approve.target(), FileStatus::ApprovedForPrint);
        assert_eq!(Transition::Reject.target(), FileStatus::Rejected);
        assert_eq!(Transition::GeneratePdf.target(), FileStatus::Signing);
        assert_eq!(Transition::UploadSigned.source(), FileStatus::Signing);
        assert_eq!(Transition::UploadSigned.target(), FileStatus::Signing);
        assert_eq!(Transition::Finalize.target(), FileStatus::Finalized);
    }

    #[test]
    fn test_transition_roles() {
        assert!(Transition::Approve.allows(Role::Manager));
        assert!(!Transition::Approve.allows(Role::Planner));
        assert!(Transition::Finalize.allows(Role::Planner));
        assert!(!Transition::Finalize.allows(Role::Manager));
        for t in Transition::ALL {
            assert!(t.allows(Role::Admin));
        }
    }
}
