use crate::model::{ClassifierError, ClassifierOutput, FeatureMap};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Optional external classifier. Its probabilities only ever raise a
/// finding's confidence; scoring works without it.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, features: &FeatureMap) -> Result<ClassifierOutput, ClassifierError>;
}

/// Posts the feature map as JSON and expects `{label, probabilities}` back.
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

fn map_request_error(e: reqwest::Error) -> ClassifierError {
    if e.is_timeout() {
        ClassifierError::Timeout
    } else {
        ClassifierError::HttpError(e.to_string())
    }
}

#[async_trait::async_trait]
impl Classifier for HttpClassifier {
    async fn predict(&self, features: &FeatureMap) -> Result<ClassifierOutput, ClassifierError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(features)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::InvalidResponse(status.as_u16()));
        }

        let output: ClassifierOutput = response.json().await.map_err(map_request_error)?;
        debug!("Classifier label: {}", output.label);
        Ok(output)
    }
}

/// Runs the classifier and falls back to no probabilities on any failure.
pub async fn probabilities_or_empty(
    classifier: &dyn Classifier,
    features: &FeatureMap,
) -> HashMap<String, f64> {
    match classifier.predict(features).await {
        Ok(output) => output.probabilities,
        Err(e) => {
            warn!("Classifier unavailable, scoring with rules only: {}", e);
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait::async_trait]
    impl Classifier for Failing {
        async fn predict(&self, _: &FeatureMap) -> Result<ClassifierOutput, ClassifierError> {
            Err(ClassifierError::Timeout)
        }
    }

    struct Fixed(ClassifierOutput);

    #[async_trait::async_trait]
    impl Classifier for Fixed {
        async fn predict(&self, _: &FeatureMap) -> Result<ClassifierOutput, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn failure_degrades_to_empty() {
        let probabilities = probabilities_or_empty(&Failing, &FeatureMap::new()).await;
        assert!(probabilities.is_empty());
    }

    #[tokio::test]
    async fn success_passes_probabilities_through() {
        let output = ClassifierOutput {
            label: "Anemia Risk".into(),
            probabilities: HashMap::from([("Anemia Risk".to_string(), 0.7)]),
        };
        let probabilities = probabilities_or_empty(&Fixed(output), &FeatureMap::new()).await;
        assert_eq!(probabilities.get("Anemia Risk"), Some(&0.7));
    }

    #[test]
    fn parses_partial_response() {
        let output: ClassifierOutput =
            serde_json::from_str(r#"{"probabilities": {"PID Risk": 0.3}}"#).unwrap();
        assert_eq!(output.label, "");
        assert_eq!(output.probabilities.len(), 1);
    }

    #[test]
    fn builds_with_timeout() {
        assert!(HttpClassifier::new("http://127.0.0.1:9/predict", Duration::from_secs(2)).is_ok());
    }
}
