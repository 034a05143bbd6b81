//! Remote chat integration for Clout.
//!
//! This crate exposes the [`traits::ChatClient`] interface, an
//! OpenAI-compatible implementation, and the [`json`] helpers used to read
//! structured answers out of model replies.
//!
//! # Examples
//! ```no_run
//! use clout_config::LlmSettings;
//! use clout_llm::chat_client_from_settings;
//!
//! let settings = LlmSettings::default(); // no credential
//! let client = chat_client_from_settings(&settings).unwrap();
//! assert!(client.is_none());
//! ```
pub mod json;
pub mod openai;
pub mod traits;

use clout_common::Result;
use clout_config::LlmSettings;
use openai::OpenAiChatClient;
use std::sync::Arc;
use traits::ChatClient;

/// Build a chat client when a credential is configured.
///
/// `Ok(None)` means there is no credential, which is not an error: callers
/// use their local heuristics instead.
pub fn chat_client_from_settings(
    settings: &LlmSettings,
) -> Result<Option<Arc<dyn ChatClient + Send + Sync + 'static>>> {
    let Some(api_key) = settings.credential() else {
        tracing::info!("no LLM credential configured; remote scoring disabled");
        return Ok(None);
    };

    let client = OpenAiChatClient::new(api_key, settings.model.clone(), &settings.endpoint)?
        .with_timeout(settings.timeout());
    Ok(Some(Arc::new(client)))
}
