//! Actions and the three-phase request lifecycle.

use std::fmt;

use crate::error::{ApiErrorEnvelope, FailurePayload};

/// A message dispatched into the [`Store`](crate::Store).
///
/// Every action names its [`ActionKind`]. Sagas are keyed by the kind of the
/// request they watch, so two requests with the same kind supersede each
/// other while different kinds run side by side.
pub trait Action: Clone + fmt::Debug + Send + Sync + 'static {
    /// Static identity of this action.
    fn kind(&self) -> ActionKind;

    /// Reset actions restore the whole state tree to its default shape.
    fn is_reset(&self) -> bool {
        false
    }
}

/// Position of an action within the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseTag {
    Request,
    Success,
    Failure,
    /// Plain state edits that never reach the network.
    Command,
}

impl PhaseTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Command => "command",
        }
    }
}

/// Static identity of an action: which slice, which operation, which phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionKind {
    pub slice: &'static str,
    pub operation: &'static str,
    pub phase: PhaseTag,
}

impl ActionKind {
    pub const fn new(slice: &'static str, operation: &'static str, phase: PhaseTag) -> Self {
        Self {
            slice,
            operation,
            phase,
        }
    }

    pub const fn command(slice: &'static str, operation: &'static str) -> Self {
        Self::new(slice, operation, PhaseTag::Command)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.slice, self.operation, self.phase.as_str())
    }
}

/// One operation's lifecycle as a closed sum type.
///
/// `Req` is the call's input (filters, body, id), `Res` the decoded response
/// envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<Req, Res> {
    Request(Req),
    Success(Res),
    Failure(FailurePayload),
}

impl<Req, Res> Phase<Req, Res> {
    /// Turns a saga outcome into the terminal phase.
    pub fn settle(outcome: Result<Res, ApiErrorEnvelope>) -> Self {
        match outcome {
            Ok(payload) => Self::Success(payload),
            Err(envelope) => Self::Failure(FailurePayload::Envelope(envelope)),
        }
    }

    pub fn tag(&self) -> PhaseTag {
        match self {
            Self::Request(_) => PhaseTag::Request,
            Self::Success(_) => PhaseTag::Success,
            Self::Failure(_) => PhaseTag::Failure,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_joins_segments() {
        let kind = ActionKind::new("academicYear", "list", PhaseTag::Request);
        assert_eq!(kind.to_string(), "academicYear/list/request");
    }

    #[test]
    fn test_settle_maps_error_to_failure_envelope() {
        let phase: Phase<(), u32> = Phase::settle(Err(ApiErrorEnvelope::new("boom")));
        assert_eq!(phase.tag(), PhaseTag::Failure);
        assert_eq!(
            phase,
            Phase::Failure(FailurePayload::Envelope(ApiErrorEnvelope::new("boom")))
        );

        let phase: Phase<(), u32> = Phase::settle(Ok(7));
        assert!(phase.is_success());
    }
}
