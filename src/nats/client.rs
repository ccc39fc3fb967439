use crate::error::{Result, ScribeError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

pub struct NatsClient {
    client: async_nats::Client,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .map_err(|e| ScribeError::transport(format!("failed to connect to NATS: {}", e)))?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Send a request and parse the JSON reply
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        subject: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<T> {
        debug!("Request to {} ({} bytes)", subject, payload.len());

        let response = tokio::time::timeout(
            timeout,
            self.client.request(subject.to_string(), payload.into()),
        )
        .await
        .map_err(|_| ScribeError::transport(format!("request to {} timed out", subject)))?
        .map_err(|e| ScribeError::transport(format!("request to {} failed: {}", subject, e)))?;

        serde_json::from_slice(&response.payload)
            .map_err(|e| ScribeError::transport(format!("malformed reply from {}: {}", subject, e)))
    }

    /// Publish a JSON message without awaiting a reply
    pub async fn publish_json<T: Serialize>(&self, subject: &str, message: &T) -> Result<()> {
        let payload = serde_json::to_vec(message)
            .map_err(|e| ScribeError::transport(format!("failed to encode message: {}", e)))?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| ScribeError::transport(format!("publish to {} failed: {}", subject, e)))?;

        Ok(())
    }
}
