//! HTTP client for the ML prediction service.
//!
//! Posts the camp context as JSON to `{base_url}/predict` and decodes the
//! structured prediction. `204 No Content` means the service has no opinion.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use super::{ExternalPredictor, Prediction, PredictionRequest, PredictorError, PredictorResult};

#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpPredictor {
    /// Build a client for the service at `base_url`.
    ///
    /// `timeout` bounds each request at the transport level; the engine adds
    /// its own timeout on top.
    pub fn new(base_url: &str, timeout: Duration) -> PredictorResult<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(PredictorError::Transport(
                "Predictor base URL is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictorError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/predict", base),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ExternalPredictor for HttpPredictor {
    async fn predict(&self, request: &PredictionRequest) -> PredictorResult<Option<Prediction>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PredictorError::Timeout(self.timeout)
                } else {
                    PredictorError::Transport(format!("Failed to call predictor: {}", e))
                }
            })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| PredictorError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(PredictorError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }

        let prediction: Prediction = serde_json::from_str(&body)
            .map_err(|e| PredictorError::Malformed(format!("{} ({})", e, body.trim())))?;

        Ok(Some(prediction))
    }

    fn name(&self) -> &str {
        "ml-http"
    }
}
