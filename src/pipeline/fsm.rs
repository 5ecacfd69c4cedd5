use crate::{
    Error, Result,
    service::{Diagnosis, JobHandle, RecommendationSet},
};
use tracing::{debug, info, warn};

// Sequence states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Idle,
    Uploading,
    Polling,
    FetchingRecommendations,
    Done,
    Errored,
}

// Sequence events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    Start,
    UploadAcknowledged,
    DiagnosisReady,
    RecommendationsReady,
    ErrorOccurred,
    Reset,
}

// Data gathered while a sequence moves forward
#[derive(Debug, Clone, Default)]
pub struct SequenceContext {
    pub job: Option<JobHandle>,
    pub diagnosis: Option<Diagnosis>,
    pub recommendations: Option<RecommendationSet>,
    pub last_error: Option<String>,
}

impl SequenceContext {
    pub fn set_error(&mut self, error: String) {
        self.last_error = Some(error);
    }
}

pub struct SequenceStateMachine {
    state: SequenceState,
    pub context: SequenceContext,
}

impl Default for SequenceStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceStateMachine {
    pub fn new() -> Self {
        Self {
            state: SequenceState::Idle,
            context: SequenceContext::default(),
        }
    }

    pub fn current_state(&self) -> SequenceState {
        self.state
    }

    pub fn transition(&mut self, event: SequenceEvent) -> Result<()> {
        let old_state = self.state;
        debug!("Sequence processing event {:?} in state {:?}", event, old_state);

        let new_state = match (self.state, event) {
            (SequenceState::Idle, SequenceEvent::Start) => SequenceState::Uploading,
            (SequenceState::Uploading, SequenceEvent::UploadAcknowledged) => SequenceState::Polling,
            (SequenceState::Polling, SequenceEvent::DiagnosisReady) => {
                SequenceState::FetchingRecommendations
            }
            (SequenceState::FetchingRecommendations, SequenceEvent::RecommendationsReady) => {
                SequenceState::Done
            }
            (
                SequenceState::Uploading
                | SequenceState::Polling
                | SequenceState::FetchingRecommendations,
                SequenceEvent::ErrorOccurred,
            ) => SequenceState::Errored,
            (SequenceState::Done | SequenceState::Errored, SequenceEvent::Reset) => {
                self.context = SequenceContext::default();
                SequenceState::Idle
            }
            _ => {
                warn!(
                    "Invalid sequence transition from {:?} with event {:?}",
                    self.state, event
                );
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", self.state),
                    requested: format!("{:?}", event),
                });
            }
        };

        info!(
            "Sequence state transition: {:?} -> {:?} (event: {:?})",
            old_state, new_state, event
        );

        self.state = new_state;
        Ok(())
    }

    /// Records the failure and moves to `Errored`.
    pub fn fail(&mut self, error: &Error) -> Result<()> {
        self.context.set_error(error.to_string());
        self.transition(SequenceEvent::ErrorOccurred)
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            SequenceState::Uploading | SequenceState::Polling | SequenceState::FetchingRecommendations
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SequenceState::Done | SequenceState::Errored)
    }

    pub fn get_last_error(&self) -> Option<&str> {
        self.context.last_error.as_deref()
    }
}
