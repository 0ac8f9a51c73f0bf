//! Agent Lifecycle
//!
//! State transitions of one agent version. A failed install or activate
//! makes the agent redundant; the host replaces it with a fresh one.

use crate::error::AgentError;

/// Agent states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentState {
    /// Registered, not yet installed
    #[default]
    Parsed,
    /// Install event running
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Activate event running
    Activating,
    /// Active and controlling clients
    Activated,
    /// Failed or replaced
    Redundant,
}

/// Check if a state transition is valid
pub fn is_valid_transition(from: AgentState, to: AgentState) -> bool {
    use AgentState::*;

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Installed)
            | (Installing, Redundant)
            | (Installed, Activating)
            | (Activating, Activated)
            | (Activating, Redundant)
            | (Activated, Redundant)
    )
}

/// Lifecycle bookkeeping for one agent.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: AgentState,
    skip_waiting: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AgentState::Activated
    }

    /// Whether the agent asked to activate without waiting for old clients.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting
    }

    pub fn skip_waiting(&mut self) {
        self.skip_waiting = true;
    }

    /// Transition to `to`, rejecting moves the lifecycle does not allow.
    pub fn transition(&mut self, to: AgentState) -> Result<(), AgentError> {
        let from = self.state;
        if !is_valid_transition(from, to) {
            return Err(AgentError::InvalidStateTransition { from, to });
        }
        log::debug!("[CDB Agent] {:?} -> {:?}", from, to);
        self.state = to;
        Ok(())
    }
}
