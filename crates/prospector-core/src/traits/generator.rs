//! Chat-completion endpoint trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerateParams, Message};

/// A chat-completion backend. The endpoint is supplied per call so a single
/// client can serve requests aimed at different inference servers.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(
        &self,
        endpoint: &str,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<String>;
}
