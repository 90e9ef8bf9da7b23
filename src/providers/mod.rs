use async_trait::async_trait;

use crate::core::error::DchatError;
use crate::discussion::Message;

/// Boundary to the hosted chat-completion service: one reply per call,
/// failures surfaced as [`DchatError::Gateway`] without retrying.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<String, DchatError>;
}

pub mod base_client;
pub mod openai;
