//! Generator endpoint configuration.

/// Base URL of the public sheet generator.
pub const DEFAULT_ENDPOINT: &str = "https://ficha-rpg-puq8.onrender.com";

/// Path appended to the endpoint to request a new sheet.
pub const GENERATE_PATH: &str = "/generate";

/// Where the generator lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    endpoint: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Creates a configuration pointing at the default generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the generator base URL. Blank values keep the current endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let trimmed = endpoint.trim();
        if !trimmed.is_empty() {
            self.endpoint = trimmed.to_string();
        }
        self
    }

    /// Returns the configured base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the full URL of the generate call.
    pub fn generate_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), GENERATE_PATH)
    }
}
