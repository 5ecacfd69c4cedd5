use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Body of `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status_url: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Opaque reference to an analysis running on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobHandle {
    StatusUrl(String),
    TaskId(String),
}

impl JobHandle {
    /// Path (or absolute URL) to query for this job's status.
    pub fn status_path(&self) -> String {
        match self {
            Self::StatusUrl(url) => url.clone(),
            Self::TaskId(id) => format!("/result/{}", id),
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusUrl(url) => write!(f, "{}", url),
            Self::TaskId(id) => write!(f, "task {}", id),
        }
    }
}

/// A successful upload acknowledgement. Only constructible with a job handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAck {
    pub handle: JobHandle,
}

impl TryFrom<UploadResponse> for UploadAck {
    type Error = Error;

    fn try_from(response: UploadResponse) -> Result<Self> {
        if !response.success {
            return Err(Error::protocol(format!(
                "upload was not acknowledged: {}",
                response
                    .error
                    .unwrap_or_else(|| "no reason given".to_string())
            )));
        }

        let handle = match (non_empty(response.status_url), non_empty(response.task_id)) {
            (Some(url), _) => JobHandle::StatusUrl(url),
            (None, Some(id)) => JobHandle::TaskId(id),
            (None, None) => {
                return Err(Error::protocol(
                    "upload response did not include a status_url or task_id",
                ));
            }
        };

        Ok(Self { handle })
    }
}

/// Body of a status request, tagged by its `status` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusResponse {
    Processing,
    Completed {
        prediction: String,
        confidence: f64,
        #[serde(default)]
        full_output: Value,
    },
    Failed {
        #[serde(default)]
        error: Option<String>,
    },
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Processing,
    Completed(Diagnosis),
    Failed(String),
    NotFound,
}

impl TryFrom<StatusResponse> for JobStatus {
    type Error = Error;

    fn try_from(response: StatusResponse) -> Result<Self> {
        Ok(match response {
            StatusResponse::Processing => Self::Processing,
            StatusResponse::Completed {
                prediction,
                confidence,
                full_output,
            } => Self::Completed(Diagnosis::new(prediction, confidence, full_output)?),
            StatusResponse::Failed { error } => Self::Failed(
                error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Analysis failed on the server.".to_string()),
            ),
            StatusResponse::NotFound => Self::NotFound,
        })
    }
}

/// Classification produced by a completed analysis job.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    condition: String,
    confidence: f64,
    raw_output: Value,
}

impl Diagnosis {
    pub fn new(condition: impl Into<String>, confidence: f64, raw_output: Value) -> Result<Self> {
        let condition = condition.into().trim().to_string();
        if condition.is_empty() {
            return Err(Error::protocol("completed analysis has an empty prediction"));
        }
        Ok(Self {
            condition,
            confidence,
            raw_output,
        })
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn raw_output(&self) -> &Value {
        &self.raw_output
    }
}

/// Body of `POST /recommend`.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendRequest<'a> {
    pub skin_disease: &'a str,
    pub allergies: &'a [String],
}

/// Raw body of `POST /recommend`. A 200 carries either the recommendation
/// lists or `{"error": ...}`; anything else is a protocol error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub healthy_foods: Option<Vec<HealthyFood>>,
    #[serde(default)]
    pub foods_to_avoid: Option<Vec<String>>,
    #[serde(default)]
    pub supplements: Option<Vec<Supplement>>,
}

impl TryFrom<RecommendResponse> for RecommendationSet {
    type Error = Error;

    fn try_from(response: RecommendResponse) -> Result<Self> {
        if let Some(error) = non_empty(response.error) {
            return Err(Error::protocol(format!(
                "recommendation service error: {}",
                error
            )));
        }

        if response.healthy_foods.is_none()
            && response.foods_to_avoid.is_none()
            && response.supplements.is_none()
        {
            return Err(Error::protocol(
                "recommendation response has no healthy_foods, foods_to_avoid or supplements",
            ));
        }

        Ok(Self {
            condition: non_empty(response.condition),
            healthy_foods: response.healthy_foods.unwrap_or_default(),
            foods_to_avoid: response.foods_to_avoid.unwrap_or_default(),
            supplements: response.supplements.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default)]
    pub healthy_foods: Vec<HealthyFood>,
    #[serde(default)]
    pub foods_to_avoid: Vec<String>,
    #[serde(default)]
    pub supplements: Vec<Supplement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthyFood {
    pub name: String,
    #[serde(default)]
    pub benefit: String,
    #[serde(default)]
    pub nutrients: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Supplement {
    pub name: String,
    #[serde(default)]
    pub benefit: String,
    #[serde(default)]
    pub dosage: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
