//! Fetching sheets from the remote generator.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::model::CharacterSheet;

/// Errors that can occur while fetching a sheet.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Generator error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse sheet: {0}")]
    Parse(String),
}

/// Anything that can produce a fresh character sheet.
///
/// The controller only talks to this trait, so the HTTP client can be swapped
/// for canned or scripted sources.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Produces one new sheet.
    async fn fetch(&self) -> Result<CharacterSheet, FetchError>;
}

#[async_trait]
impl<T: SheetSource + ?Sized> SheetSource for Arc<T> {
    async fn fetch(&self) -> Result<CharacterSheet, FetchError> {
        (**self).fetch().await
    }
}

/// HTTP client for the sheet generator.
#[derive(Clone)]
pub struct GeneratorClient {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl GeneratorClient {
    /// Creates a client for the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Issues a single `GET <endpoint>/generate` and parses the body.
    pub async fn generate(&self) -> Result<CharacterSheet, FetchError> {
        let url = self.config.generate_url();
        debug!("Requesting new sheet from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, message });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        CharacterSheet::from_json(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

impl Default for GeneratorClient {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

#[async_trait]
impl SheetSource for GeneratorClient {
    async fn fetch(&self) -> Result<CharacterSheet, FetchError> {
        self.generate().await
    }
}
