//! HTTP listener and database location settings.

use serde::{Deserialize, Serialize};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8310";
const DEFAULT_DB_PATH: &str = "gapcert.db";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: Option<String>,
    pub db_path: Option<String>,
    /// Hard cap applied to any caller-supplied page `limit`.
    pub max_page_limit: Option<u32>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn db_path(&self) -> &str {
        self.db_path.as_deref().unwrap_or(DEFAULT_DB_PATH)
    }

    pub fn max_page_limit(&self) -> u32 {
        self.max_page_limit.unwrap_or(200)
    }
}
