//! Observability helpers for helper actions and synthesis.
//!
//! Every action runs inside a `cognito_stack.action` span carrying the `action` and `stage`
//! fields. With the `metrics` feature enabled, the `cognito_stack_action_total` counter is
//! incremented for every attempt/success/failure, labeled by `action` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
	/// Stack synthesis into a cloud assembly.
	Synth,
	/// Administrator user creation.
	CreateUser,
	/// Permanent password assignment.
	ConfirmUser,
	/// Creation followed by confirmation.
	CreateNewUser,
	/// Token generation.
	GenerateToken,
	/// Creation, confirmation, and token generation.
	FullFlow,
}
impl ActionKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ActionKind::Synth => "synth",
			ActionKind::CreateUser => "create-user",
			ActionKind::ConfirmUser => "confirm-user",
			ActionKind::CreateNewUser => "create-new-user",
			ActionKind::GenerateToken => "generate-token",
			ActionKind::FullFlow => "full-flow",
		}
	}
}
impl Display for ActionKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionOutcome {
	/// Entry to an action.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl ActionOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ActionOutcome::Attempt => "attempt",
			ActionOutcome::Success => "success",
			ActionOutcome::Failure => "failure",
		}
	}
}
impl Display for ActionOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
