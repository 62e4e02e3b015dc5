//! Property-based tests for WorkflowService.

use proptest::prelude::*;
use uuid::Uuid;

use crate::auth::{Actor, Role};
use crate::workflow::error::{Violation, WorkflowError};
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{FileStatus, Transition};

fn arb_status() -> impl Strategy<Value = FileStatus> {
    prop::sample::select(FileStatus::ALL.to_vec())
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn arb_transition() -> impl Strategy<Value = Transition> {
    prop::sample::select(Transition::ALL.to_vec())
}

fn arb_actor() -> impl Strategy<Value = Actor> {
    (any::<u128>(), arb_role()).prop_map(|(id, role)| Actor::new(Uuid::from_u128(id), "someone", role))
}

/// Runs `transition` with preconditions other than role/status satisfied.
fn attempt(
    transition: Transition,
    status: FileStatus,
    actor: &Actor,
) -> Result<FileStatus, WorkflowError> {
    let action = match transition {
        Transition::Approve => WorkflowService::approve(status, actor),
        Transition::Reject => WorkflowService::reject(status, actor, "totals do not match"),
        Transition::GeneratePdf => WorkflowService::generate_pdf(status, actor),
        Transition::UploadSigned => WorkflowService::upload_signed(status, actor),
        Transition::Finalize => WorkflowService::finalize(status, actor, true),
    }?;
    Ok(action.new_status())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A successful transition always follows one of the workflow edges.
    #[test]
    fn prop_success_follows_an_edge(
        status in arb_status(),
        transition in arb_transition(),
        actor in arb_actor(),
    ) {
        if let Ok(next) = attempt(transition, status, &actor) {
            prop_assert!(WorkflowService::is_valid_transition(status, next));
            prop_assert_eq!(next, transition.target());
        }
    }

    /// The permitted-actions surface agrees with what actually succeeds.
    #[test]
    fn prop_permitted_actions_match_outcomes(
        status in arb_status(),
        transition in arb_transition(),
        actor in arb_actor(),
    ) {
        let permitted = WorkflowService::permitted_actions(actor.role, status).contains(&transition);
        prop_assert_eq!(permitted, attempt(transition, status, &actor).is_ok());
    }

    /// A role failure is reported as such, never as a status failure.
    #[test]
    fn prop_role_checked_first(
        status in arb_status(),
        transition in arb_transition(),
        actor in arb_actor(),
    ) {
        if !transition.allows(actor.role) {
            let err = attempt(transition, status, &actor).unwrap_err();
            let is_role_violation = matches!(
                err,
                WorkflowError::InvalidTransition { violation: Violation::RoleNotPermitted(r), .. } if r == actor.role
            );
            prop_assert!(is_role_violation);
        }
    }

    /// Terminal statuses accept no transition at all.
    #[test]
    fn prop_terminal_statuses_are_final(
        transition in arb_transition(),
        actor in arb_actor(),
    ) {
        prop_assert!(attempt(transition, FileStatus::Finalized, &actor).is_err());
        prop_assert!(attempt(transition, FileStatus::Rejected, &actor).is_err());
    }

    /// Finalize without a signed scan fails for every role and status.
    #[test]
    fn prop_finalize_needs_signed_document(
        status in arb_status(),
        actor in arb_actor(),
    ) {
        prop_assert!(WorkflowService::finalize(status, &actor, false).is_err());
    }

    /// Whitespace-only reasons never reject a file.
    #[test]
    fn prop_blank_reason_never_rejects(
        reason in "[ \t\n]{0,10}",
        actor in arb_actor(),
    ) {
        prop_assert!(WorkflowService::reject(FileStatus::PendingApproval, &actor, &reason).is_err());
    }
}
