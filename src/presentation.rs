use crate::{
    allergies::AllergyList,
    service::{Diagnosis, RecommendationSet},
};
use serde::Serialize;
use serde_json::Value;

/// Everything a finished analysis hands to the result screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub diagnosis: Diagnosis,
    pub recommendations: RecommendationSet,
    pub allergies: AllergyList,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationPayload {
    pub diagnosis: String,
    pub confidence: f64,
    pub full_output: Value,
    pub recommendations: RecommendationSet,
    pub allergies: String,
}

impl AnalysisOutcome {
    pub fn payload(&self) -> PresentationPayload {
        PresentationPayload {
            diagnosis: self.diagnosis.condition().to_string(),
            confidence: self.diagnosis.confidence(),
            full_output: self.diagnosis.raw_output().clone(),
            recommendations: self.recommendations.clone(),
            allergies: self.allergies.raw().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::HealthyFood;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_payload_serialization() {
        let outcome = AnalysisOutcome {
            diagnosis: Diagnosis::new("Eczema", 0.85, Value::Null).unwrap(),
            recommendations: RecommendationSet {
                healthy_foods: vec![HealthyFood {
                    name: "Salmon".to_string(),
                    benefit: "Omega-3".to_string(),
                    nutrients: "EPA, DHA".to_string(),
                }],
                ..Default::default()
            },
            allergies: AllergyList::parse("peanuts"),
        };

        let value = serde_json::to_value(outcome.payload()).unwrap();
        assert_eq!(value["diagnosis"], json!("Eczema"));
        assert_eq!(value["confidence"], json!(0.85));
        assert_eq!(value["allergies"], json!("peanuts"));
        assert_eq!(
            value["recommendations"]["healthy_foods"][0]["name"],
            json!("Salmon")
        );
    }
}
