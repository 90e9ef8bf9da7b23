use reqwest::{Client, Response};
use serde::Serialize;

use crate::core::error::DchatError;

/// Bearer-authenticated JSON POST client shared by gateway implementations.
pub struct BaseApiClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl BaseApiClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            endpoint,
            api_key,
            client: Client::new(),
        }
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, DchatError> {
        let url = format!("{}/{}", self.endpoint.trim_end_matches('/'), path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DchatError::Gateway(format!(
                "API returned {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(response)
    }
}
