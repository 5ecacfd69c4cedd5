use super::fsm::{SequenceEvent, SequenceState, SequenceStateMachine};
use crate::{
    Error, Result,
    allergies::AllergyList,
    config::Config,
    image::ImageAsset,
    poller::{PollingPolicy, StatusPoller, cancellable},
    presentation::AnalysisOutcome,
    service::{HttpInferenceClient, InferenceClient},
};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Drives upload, status polling and the recommendation request for one
/// user session. Taking `&mut self` keeps a single sequence in flight.
pub struct Analyzer {
    client: Box<dyn InferenceClient>,
    policy: PollingPolicy,
    fsm: SequenceStateMachine,
}

impl Analyzer {
    pub fn new(config: &Config) -> Result<Self> {
        info!("Initializing analyzer for {}", config.service.base_url);

        let client = HttpInferenceClient::new(&config.service)?;
        Ok(Self::with_client(
            Box::new(client),
            PollingPolicy::from(&config.polling),
        ))
    }

    pub fn with_client(client: Box<dyn InferenceClient>, policy: PollingPolicy) -> Self {
        Self {
            client,
            policy,
            fsm: SequenceStateMachine::new(),
        }
    }

    pub fn state(&self) -> SequenceState {
        self.fsm.current_state()
    }

    pub fn state_machine(&self) -> &SequenceStateMachine {
        &self.fsm
    }

    pub fn last_error(&self) -> Option<&str> {
        self.fsm.get_last_error()
    }

    pub fn client(&self) -> &dyn InferenceClient {
        self.client.as_ref()
    }

    pub async fn analyze(
        &mut self,
        image: Option<ImageAsset>,
        allergy_input: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome> {
        let image = image.ok_or(Error::NoImageSelected)?;
        let allergies = AllergyList::parse(allergy_input);

        if self.fsm.is_active() {
            // A previous run was dropped mid-flight.
            warn!("Discarding abandoned sequence in state {:?}", self.fsm.current_state());
            self.fsm.fail(&Error::Cancelled)?;
        }
        if self.fsm.is_terminal() {
            self.fsm.transition(SequenceEvent::Reset)?;
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", %run_id, image = %image.filename);
        self.fsm.transition(SequenceEvent::Start)?;

        async {
            info!(
                "Starting analysis with {} declared allergies",
                allergies.len()
            );
            let start_time = std::time::Instant::now();

            match self.run_stages(image, allergies, cancel).await {
                Ok(outcome) => {
                    info!("Analysis finished in {:?}", start_time.elapsed());
                    Ok(outcome)
                }
                Err(e) => {
                    error!(
                        "Analysis failed in state {:?}: {}",
                        self.fsm.current_state(),
                        e
                    );
                    if let Err(fsm_err) = self.fsm.fail(&e) {
                        warn!("Could not record failure: {}", fsm_err);
                    }
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &mut self,
        image: ImageAsset,
        allergies: AllergyList,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome> {
        let ack = cancellable(cancel, self.client.upload(image)).await??;
        info!("Upload acknowledged: {}", ack.handle);
        self.fsm.context.job = Some(ack.handle.clone());
        self.fsm.transition(SequenceEvent::UploadAcknowledged)?;

        let diagnosis = StatusPoller::new(self.client.as_ref(), self.policy)
            .poll(&ack.handle, cancel)
            .await?;
        self.fsm.context.diagnosis = Some(diagnosis.clone());
        self.fsm.transition(SequenceEvent::DiagnosisReady)?;

        debug!(
            "Fetching recommendations for '{}' with allergies {:?}",
            diagnosis.condition(),
            allergies.entries()
        );
        let recommendations = cancellable(
            cancel,
            self.client
                .recommend(diagnosis.condition(), allergies.entries()),
        )
        .await??;
        self.fsm.context.recommendations = Some(recommendations.clone());
        self.fsm.transition(SequenceEvent::RecommendationsReady)?;

        Ok(AnalysisOutcome {
            diagnosis,
            recommendations,
            allergies,
        })
    }
}
