use async_trait::async_trait;
use reqwest::Client;
use roadsense_core::{ProcessedRecord, StoreError, StoreGateway};

/// Store gateway that ships batches to the roadsense store service over
/// HTTP. A non-2xx response is a retryable refusal, not a fault; the sink
/// owns the retry policy.
pub struct HttpStoreGateway {
    client: Client,
    endpoint: String,
}

impl HttpStoreGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/records", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl StoreGateway for HttpStoreGateway {
    async fn save(&self, batch: &[ProcessedRecord]) -> Result<(), StoreError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&batch)
            .send()
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Rejected(format!("HTTP {}", response.status())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_cleanly_with_and_without_trailing_slash() {
        assert_eq!(
            HttpStoreGateway::new("http://localhost:8000").endpoint,
            "http://localhost:8000/records"
        );
        assert_eq!(
            HttpStoreGateway::new("http://localhost:8000/").endpoint,
            "http://localhost:8000/records"
        );
    }
}
