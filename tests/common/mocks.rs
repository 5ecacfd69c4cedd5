use async_trait::async_trait;
use skinscan::{
    Error, Result,
    image::ImageAsset,
    service::{
        Diagnosis, HealthyFood, InferenceClient, JobHandle, JobStatus, RecommendationSet,
        Supplement, UploadAck,
    },
};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Request that never completes once the mock is told to stall on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stall {
    Upload,
    Status,
    Recommend,
}

/// Scripted inference service. Clones share state, so a test can keep one
/// handle while the analyzer owns another.
#[derive(Debug, Clone)]
pub struct MockInferenceClient {
    pub upload_result: Arc<Mutex<Result<UploadAck>>>,
    pub statuses: Arc<Mutex<Vec<Result<JobStatus>>>>,
    pub recommendation: Arc<Mutex<Result<RecommendationSet>>>,
    pub uploads: Arc<Mutex<Vec<ImageAsset>>>,
    pub status_calls: Arc<Mutex<Vec<(JobHandle, Instant)>>>,
    pub recommend_calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    pub stall: Arc<Mutex<Option<Stall>>>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            upload_result: Arc::new(Mutex::new(Ok(UploadAck {
                handle: JobHandle::StatusUrl("/status/abc".to_string()),
            }))),
            statuses: Arc::new(Mutex::new(Vec::new())),
            recommendation: Arc::new(Mutex::new(Ok(create_mock_recommendations()))),
            uploads: Arc::new(Mutex::new(Vec::new())),
            status_calls: Arc::new(Mutex::new(Vec::new())),
            recommend_calls: Arc::new(Mutex::new(Vec::new())),
            stall: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_upload_result(self, result: Result<UploadAck>) -> Self {
        *self.upload_result.lock().unwrap() = result;
        self
    }

    /// Statuses returned in order; the last one repeats forever.
    pub fn with_statuses(self, statuses: Vec<Result<JobStatus>>) -> Self {
        *self.statuses.lock().unwrap() = statuses;
        self
    }

    pub fn with_recommendation(self, result: Result<RecommendationSet>) -> Self {
        *self.recommendation.lock().unwrap() = result;
        self
    }

    pub fn stalling_on(self, stage: Stall) -> Self {
        *self.stall.lock().unwrap() = Some(stage);
        self
    }

    async fn stall_if(&self, stage: Stall) {
        let stalled = *self.stall.lock().unwrap() == Some(stage);
        if stalled {
            std::future::pending::<()>().await;
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn status_count(&self) -> usize {
        self.status_calls.lock().unwrap().len()
    }

    pub fn status_times(&self) -> Vec<Instant> {
        self.status_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn recommend_calls(&self) -> Vec<(String, Vec<String>)> {
        self.recommend_calls.lock().unwrap().clone()
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn upload(&self, asset: ImageAsset) -> Result<UploadAck> {
        self.uploads.lock().unwrap().push(asset);
        self.stall_if(Stall::Upload).await;
        self.upload_result.lock().unwrap().clone()
    }

    async fn status(&self, handle: &JobHandle) -> Result<JobStatus> {
        self.status_calls
            .lock()
            .unwrap()
            .push((handle.clone(), Instant::now()));
        self.stall_if(Stall::Status).await;

        let mut statuses = self.statuses.lock().unwrap();
        match statuses.len() {
            0 => Err(Error::internal("No more mock statuses available")),
            1 => statuses[0].clone(),
            _ => statuses.remove(0),
        }
    }

    async fn recommend(&self, condition: &str, allergies: &[String]) -> Result<RecommendationSet> {
        self.recommend_calls
            .lock()
            .unwrap()
            .push((condition.to_string(), allergies.to_vec()));
        self.stall_if(Stall::Recommend).await;
        self.recommendation.lock().unwrap().clone()
    }

    async fn health(&self) -> Result<String> {
        Ok("API is running".to_string())
    }
}

pub fn create_mock_diagnosis(condition: &str, confidence: f64) -> Diagnosis {
    Diagnosis::new(condition, confidence, serde_json::json!({ "prediction": condition, "confidence": confidence })).unwrap()
}

pub fn completed(condition: &str, confidence: f64) -> Result<JobStatus> {
    Ok(JobStatus::Completed(create_mock_diagnosis(condition, confidence)))
}

pub fn create_mock_recommendations() -> RecommendationSet {
    RecommendationSet {
        condition: Some("Eczema".to_string()),
        healthy_foods: vec![HealthyFood {
            name: "Fatty fish".to_string(),
            benefit: "Omega-3 fatty acids reduce inflammation".to_string(),
            nutrients: "EPA, DHA, Vitamin D".to_string(),
        }],
        foods_to_avoid: vec!["Highly processed foods".to_string()],
        supplements: vec![Supplement {
            name: "Vitamin D3".to_string(),
            benefit: "Supports skin barrier function".to_string(),
            dosage: "1000-2000 IU daily".to_string(),
        }],
    }
}
