//! Configuration structures for the bizcard pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the bizcard pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BizcardConfig {
    /// Document analysis service configuration.
    pub azure: AzureConfig,

    /// Remote table storage configuration.
    pub storage: StorageConfig,
}

impl Default for BizcardConfig {
    fn default() -> Self {
        Self {
            azure: AzureConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Azure Document Intelligence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// Service endpoint, e.g. `https://<name>.cognitiveservices.azure.com`.
    pub endpoint: String,

    /// Subscription key.
    pub key: String,

    /// Analysis model identifier.
    pub model_id: String,

    /// REST API version.
    pub api_version: String,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,

    /// Seconds to wait between result polls.
    pub poll_interval_secs: u64,

    /// Maximum number of result polls before giving up.
    pub max_poll_attempts: u32,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            key: String::new(),
            model_id: "prebuilt-businessCard".to_string(),
            api_version: "2024-11-30".to_string(),
            timeout_secs: 120,
            poll_interval_secs: 2,
            max_poll_attempts: 60,
        }
    }
}

/// Remote table (Supabase) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Project URL, e.g. `https://<ref>.supabase.co`.
    pub url: String,

    /// API key.
    pub key: String,

    /// Table name rows are persisted to.
    pub table: String,

    /// Maximum rows per insert call.
    pub insert_batch_size: usize,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            table: "business_cards".to_string(),
            insert_batch_size: 50,
            timeout_secs: 30,
        }
    }
}

impl BizcardConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Override secrets from the environment (and a `.env` file if present).
    ///
    /// Recognized variables: `AZURE_OCR_ENDPOINT`, `AZURE_OCR_KEY`,
    /// `SUPABASE_URL`, `SUPABASE_KEY`, `SUPABASE_TABLE`.
    pub fn apply_env(&mut self) {
        let _ = dotenvy::dotenv();

        if let Ok(v) = std::env::var("AZURE_OCR_ENDPOINT") {
            self.azure.endpoint = v;
        }
        if let Ok(v) = std::env::var("AZURE_OCR_KEY") {
            self.azure.key = v;
        }
        if let Ok(v) = std::env::var("SUPABASE_URL") {
            self.storage.url = v;
        }
        if let Ok(v) = std::env::var("SUPABASE_KEY") {
            self.storage.key = v;
        }
        if let Ok(v) = std::env::var("SUPABASE_TABLE") {
            self.storage.table = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BizcardConfig::default();
        assert_eq!(config.azure.model_id, "prebuilt-businessCard");
        assert_eq!(config.storage.table, "business_cards");
        assert_eq!(config.storage.insert_batch_size, 50);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: BizcardConfig =
            serde_json::from_str(r#"{"azure": {"endpoint": "https://example.test"}}"#).unwrap();
        assert_eq!(config.azure.endpoint, "https://example.test");
        assert_eq!(config.azure.max_poll_attempts, 60);
        assert_eq!(config.storage.insert_batch_size, 50);
    }
}
