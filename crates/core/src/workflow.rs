//! Claim status workflow.
//!
//! A claim moves from `DRAFT` through insurer review, the insurer's FPPA04
//! form, manager review, and the creator's confirmation to `COMPLETED`, with
//! `REJECTED` as the other terminal status. Every permitted move is one row in
//! [`TRANSITIONS`], keyed by the claim's current status and the requested
//! action and gated on who is asking. Handlers never branch on roles
//! themselves; they build an [`Actor`] and call [`authorize`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Status of a claim. Stored as TEXT in `claims.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Draft,
    PendingApproverReview,
    PendingInsurerReview,
    PendingInsurerForm,
    AwaitingEvidence,
    PendingManagerReview,
    PendingUserConfirm,
    AwaitingSignatures,
    Completed,
    Rejected,
}

impl ClaimStatus {
    /// Every status, in workflow order.
    pub const ALL: [ClaimStatus; 10] = [
        ClaimStatus::Draft,
        ClaimStatus::PendingApproverReview,
        ClaimStatus::PendingInsurerReview,
        ClaimStatus::PendingInsurerForm,
        ClaimStatus::AwaitingEvidence,
        ClaimStatus::PendingManagerReview,
        ClaimStatus::PendingUserConfirm,
        ClaimStatus::AwaitingSignatures,
        ClaimStatus::Completed,
        ClaimStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Draft => "DRAFT",
            ClaimStatus::PendingApproverReview => "PENDING_APPROVER_REVIEW",
            ClaimStatus::PendingInsurerReview => "PENDING_INSURER_REVIEW",
            ClaimStatus::PendingInsurerForm => "PENDING_INSURER_FORM",
            ClaimStatus::AwaitingEvidence => "AWAITING_EVIDENCE",
            ClaimStatus::PendingManagerReview => "PENDING_MANAGER_REVIEW",
            ClaimStatus::PendingUserConfirm => "PENDING_USER_CONFIRM",
            ClaimStatus::AwaitingSignatures => "AWAITING_SIGNATURES",
            ClaimStatus::Completed => "COMPLETED",
            ClaimStatus::Rejected => "REJECTED",
        }
    }

    /// Status a freshly created claim starts in. A claim created without the
    /// draft flag lands where `submit` from `DRAFT` would take it.
    pub fn initial(save_as_draft: bool, policy: WorkflowPolicy) -> Self {
        match (save_as_draft, policy.approver_stage) {
            (true, _) => ClaimStatus::Draft,
            (false, true) => ClaimStatus::PendingApproverReview,
            (false, false) => ClaimStatus::PendingInsurerReview,
        }
    }

    /// No action leads out of a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, ClaimStatus::Completed | ClaimStatus::Rejected)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid claim status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// An action requested against a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimAction {
    Submit,
    Resubmit,
    Approve,
    Reject,
    RequestEvidence,
    SubmitForm,
    Confirm,
    Complete,
}

impl ClaimAction {
    pub const ALL: [ClaimAction; 8] = [
        ClaimAction::Submit,
        ClaimAction::Resubmit,
        ClaimAction::Approve,
        ClaimAction::Reject,
        ClaimAction::RequestEvidence,
        ClaimAction::SubmitForm,
        ClaimAction::Confirm,
        ClaimAction::Complete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClaimAction::Submit => "submit",
            ClaimAction::Resubmit => "resubmit",
            ClaimAction::Approve => "approve",
            ClaimAction::Reject => "reject",
            ClaimAction::RequestEvidence => "request_evidence",
            ClaimAction::SubmitForm => "submit_form",
            ClaimAction::Confirm => "confirm",
            ClaimAction::Complete => "complete",
        }
    }

    /// Whether taking this action records the submission time.
    pub fn stamps_submitted_at(self) -> bool {
        matches!(self, ClaimAction::Submit | ClaimAction::Resubmit)
    }
}

impl fmt::Display for ClaimAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown action '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Actors and gates
// ---------------------------------------------------------------------------

/// The requesting user, described relative to one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
    /// The actor filed the claim.
    pub is_creator: bool,
    /// The actor is the claim's designated approver.
    pub is_approver: bool,
}

impl Actor {
    pub fn for_claim(user_id: DbId, role: Role, created_by_id: DbId, approver_id: DbId) -> Self {
        Self {
            user_id,
            role,
            is_creator: user_id == created_by_id,
            is_approver: user_id == approver_id,
        }
    }
}

/// Who may take the action in a transition row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Creator,
    Approver,
    Role(Role),
}

impl Gate {
    pub fn admits(self, actor: &Actor) -> bool {
        match self {
            Gate::Creator => actor.is_creator,
            Gate::Approver => actor.is_approver,
            Gate::Role(role) => actor.role == role,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Creator => f.write_str("the claim's creator"),
            Gate::Approver => f.write_str("the claim's approver"),
            Gate::Role(role) => write!(f, "{role} users"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// How a transition row picks the next status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Always the given status.
    To(ClaimStatus),
    /// Insurer review, or approver review first when the approver stage is on.
    Submitted,
    /// Manager review; needs an FPPA04 CPM variant on file.
    FormFiled,
    /// Completed when signatures are already on file, otherwise awaiting them.
    Confirmed,
    /// Completed; refused while no signatures are on file.
    Signed,
}

/// One permitted move: `(from, action)` is unique across [`TRANSITIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: ClaimStatus,
    pub action: ClaimAction,
    pub gate: Gate,
    pub target: Target,
}

const fn rule(
    from: ClaimStatus,
    gate: Gate,
    action: ClaimAction,
    target: Target,
) -> TransitionRule {
    TransitionRule {
        from,
        action,
        gate,
        target,
    }
}

pub const TRANSITIONS: &[TransitionRule] = &[
    rule(
        ClaimStatus::Draft,
        Gate::Creator,
        ClaimAction::Submit,
        Target::Submitted,
    ),
    rule(
        ClaimStatus::PendingApproverReview,
        Gate::Approver,
        ClaimAction::Approve,
        Target::To(ClaimStatus::PendingInsurerReview),
    ),
    rule(
        ClaimStatus::PendingApproverReview,
        Gate::Approver,
        ClaimAction::Reject,
        Target::To(ClaimStatus::Rejected),
    ),
    rule(
        ClaimStatus::PendingInsurerReview,
        Gate::Role(Role::Insurance),
        ClaimAction::Approve,
        Target::To(ClaimStatus::PendingInsurerForm),
    ),
    rule(
        ClaimStatus::PendingInsurerReview,
        Gate::Role(Role::Insurance),
        ClaimAction::Reject,
        Target::To(ClaimStatus::Rejected),
    ),
    rule(
        ClaimStatus::PendingInsurerReview,
        Gate::Role(Role::Insurance),
        ClaimAction::RequestEvidence,
        Target::To(ClaimStatus::AwaitingEvidence),
    ),
    rule(
        ClaimStatus::AwaitingEvidence,
        Gate::Creator,
        ClaimAction::Resubmit,
        Target::To(ClaimStatus::PendingInsurerReview),
    ),
    rule(
        ClaimStatus::PendingInsurerForm,
        Gate::Role(Role::Insurance),
        ClaimAction::SubmitForm,
        Target::FormFiled,
    ),
    rule(
        ClaimStatus::PendingManagerReview,
        Gate::Role(Role::Manager),
        ClaimAction::Approve,
        Target::To(ClaimStatus::PendingUserConfirm),
    ),
    rule(
        ClaimStatus::PendingManagerReview,
        Gate::Role(Role::Manager),
        ClaimAction::Reject,
        Target::To(ClaimStatus::PendingInsurerReview),
    ),
    rule(
        ClaimStatus::PendingUserConfirm,
        Gate::Creator,
        ClaimAction::Confirm,
        Target::Confirmed,
    ),
    rule(
        ClaimStatus::AwaitingSignatures,
        Gate::Creator,
        ClaimAction::Complete,
        Target::Signed,
    ),
];

/// Deployment-level switches that change where a transition lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Route submissions through the designated approver before the insurer.
    pub approver_stage: bool,
}

/// Facts about the claim aggregate some transitions depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimFacts {
    /// The claim has an FPPA04 CPM variant.
    pub has_fppa04_form: bool,
    /// The FPPA04 CPM variant lists at least one signature file.
    pub signatures_on_file: bool,
}

/// An authorized move, ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub action: ClaimAction,
    pub stamps_submitted_at: bool,
}

/// Look up the row for `(from, action)`.
pub fn find_rule(from: ClaimStatus, action: ClaimAction) -> Option<&'static TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == from && rule.action == action)
}

/// Decide whether `actor` may take `action` on a claim in `current`, and
/// where the claim ends up.
///
/// - No row for `(current, action)` -> [`CoreError::Conflict`].
/// - Row exists but the gate does not admit the actor -> [`CoreError::Forbidden`].
/// - Row's precondition on `facts` unmet -> [`CoreError::Conflict`].
pub fn authorize(
    current: ClaimStatus,
    action: ClaimAction,
    actor: &Actor,
    policy: WorkflowPolicy,
    facts: ClaimFacts,
) -> Result<Transition, CoreError> {
    let rule = find_rule(current, action).ok_or_else(|| {
        CoreError::Conflict(format!(
            "Action '{action}' is not allowed while the claim is {current}"
        ))
    })?;

    if !rule.gate.admits(actor) {
        return Err(CoreError::Forbidden(format!(
            "Forbidden: only {} may {action} a claim that is {current}",
            rule.gate
        )));
    }

    let to = match rule.target {
        Target::To(status) => status,
        Target::Submitted if policy.approver_stage => ClaimStatus::PendingApproverReview,
        Target::Submitted => ClaimStatus::PendingInsurerReview,
        Target::FormFiled => {
            if !facts.has_fppa04_form {
                return Err(CoreError::Conflict(
                    "An FPPA04 form must be filed before the claim goes to manager review".into(),
                ));
            }
            ClaimStatus::PendingManagerReview
        }
        Target::Confirmed if facts.signatures_on_file => ClaimStatus::Completed,
        Target::Confirmed => ClaimStatus::AwaitingSignatures,
        Target::Signed => {
            if !facts.signatures_on_file {
                return Err(CoreError::Conflict(
                    "Signature files are required before the claim can be completed".into(),
                ));
            }
            ClaimStatus::Completed
        }
    };

    Ok(Transition {
        from: current,
        to,
        action,
        stamps_submitted_at: action.stamps_submitted_at(),
    })
}

/// Actions `actor` may currently take on a claim in `current`.
///
/// Preconditions on claim facts are not checked here.
pub fn available_actions(current: ClaimStatus, actor: &Actor) -> Vec<ClaimAction> {
    TRANSITIONS
        .iter()
        .filter(|rule| rule.from == current && rule.gate.admits(actor))
        .map(|rule| rule.action)
        .collect()
}

/// Trim a transition comment; blank comments count as not supplied.
pub fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
