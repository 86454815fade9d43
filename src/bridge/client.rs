//! Webhook and dry-run submission bridges

use super::traits::{BridgeError, BridgeReceipt, SubmissionBridge};
use crate::config::QuizConfig;
use crate::quiz::SubmissionRecord;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// POSTs records as JSON to a webhook
pub struct WebhookBridge {
    client: reqwest::Client,
    url: url::Url,
}

impl WebhookBridge {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, BridgeError> {
        let url = url::Url::parse(url).map_err(|source| BridgeError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BridgeError::Client)?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl SubmissionBridge for WebhookBridge {
    fn describe(&self) -> String {
        format!("webhook {}", self.url)
    }

    async fn submit(&self, record: &SubmissionRecord) -> Result<BridgeReceipt, BridgeError> {
        let response = self.client.post(self.url.clone()).json(record).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BridgeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(BridgeReceipt {
            status: status.as_u16(),
            body,
        })
    }
}

/// Logs the record instead of sending it
#[derive(Debug, Default)]
pub struct DryRunBridge;

#[async_trait]
impl SubmissionBridge for DryRunBridge {
    fn describe(&self) -> String {
        "dry run".to_string()
    }

    async fn submit(&self, record: &SubmissionRecord) -> Result<BridgeReceipt, BridgeError> {
        let body = serde_json::to_string_pretty(record).unwrap_or_default();
        tracing::info!(payload = %body, "dry run submission");
        Ok(BridgeReceipt { status: 200, body })
    }
}

/// Webhook bridge when a URL is configured, dry run otherwise
pub fn from_config(config: &QuizConfig) -> Result<Arc<dyn SubmissionBridge>, BridgeError> {
    let bridge: Arc<dyn SubmissionBridge> = match config.webhook_url.as_deref() {
        Some(url) => Arc::new(WebhookBridge::new(
            url,
            Duration::from_secs(config.request_timeout_secs()),
        )?),
        None => Arc::new(DryRunBridge),
    };
    Ok(bridge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{assemble, QueryParams, Questionnaire, QuizDefinition, SubmissionContext};

    fn record() -> SubmissionRecord {
        let doc = Questionnaire::from_definition(QuizDefinition::video_impact()).unwrap();
        let ctx = SubmissionContext::capture(QueryParams::parse("token=abc"), None);
        assemble(&doc, None, &ctx)
    }

    #[test]
    fn test_dry_run_echoes_payload() {
        let bridge = DryRunBridge;
        let record = record();
        let receipt = tokio_test::block_on(bridge.submit(&record)).unwrap();
        assert_eq!(receipt.status, 200);
        assert!(receipt.body.contains("\"token\": \"abc\""));
    }

    #[test]
    fn test_from_config_without_url_is_dry_run() {
        let bridge = from_config(&QuizConfig::default()).unwrap();
        assert_eq!(bridge.describe(), "dry run");
    }

    #[test]
    fn test_from_config_with_url_is_webhook() {
        let config = QuizConfig {
            webhook_url: Some("https://hooks.example.com/quiz".to_string()),
            ..Default::default()
        };
        let bridge = from_config(&config).unwrap();
        assert_eq!(bridge.describe(), "webhook https://hooks.example.com/quiz");
    }

    #[test]
    fn test_from_config_rejects_malformed_url() {
        let config = QuizConfig {
            webhook_url: Some("hooks.example.com/quiz".to_string()),
            ..Default::default()
        };
        let err = from_config(&config).err().unwrap();
        assert!(matches!(err, BridgeError::InvalidUrl { .. }));
        assert!(err.to_string().contains("hooks.example.com/quiz"));
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_request_error() {
        let bridge = WebhookBridge::new("http://127.0.0.1:9/hook", Duration::from_secs(2)).unwrap();
        let result = bridge.submit(&record()).await;
        assert!(matches!(result, Err(BridgeError::Request(_))));
    }
}
