//! Configuration structures for the EXT bridge

use serde::{Deserialize, Serialize};

use crate::errors::{BridgeError, Result};

/// Layout names the bridge talks to, overridable per deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub properties: String,
    pub submissions: String,
    pub communications: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            properties: "Properties".to_string(),
            submissions: "ComplianceSubmissions".to_string(),
            communications: "Communications".to_string(),
        }
    }
}

/// Credentials and addressing for the EXT record-management platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Server address including scheme (e.g. "https://records.example.org")
    pub server: String,
    /// Hosted database name
    pub database: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub layouts: LayoutConfig,
}

impl BridgeConfig {
    /// Verify all four required credentials are present.
    ///
    /// Absence of any one makes the whole bridge "not configured" rather
    /// than erroring per call.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.server.trim().is_empty() {
            missing.push("server");
        }
        if self.database.trim().is_empty() {
            missing.push("database");
        }
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if self.password.trim().is_empty() {
            missing.push("password");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BridgeError::ConfigurationMissing(format!(
                "missing EXT credentials: {}",
                missing.join(", ")
            )))
        }
    }

    /// Base URL for the versioned database scope of the EXT API
    pub fn base_url(&self) -> String {
        format!("{}/api/v1/databases/{}", self.server.trim_end_matches('/'), self.database)
    }
}
