use crate::domain::value_objects::SyncStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENV_PREFIX: &str = "ATTENDANCE_SYNC_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub network: NetworkConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub api_base_url: String,
    pub scan_path: String,
    pub health_path: String,
    /// Seconds.
    pub request_timeout: u64,
    /// Milliseconds. Anything slower is reported as offline anyway.
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    pub max_retry: u32,
    pub batch_size: u32,
    pub strategy: SyncStrategy,
    pub max_record_age_hours: u64,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub item_delay_ms: u64,
    pub poor_connection_item_delay_ms: u64,
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
                connection_timeout: 30,
            },
            network: NetworkConfig {
                api_base_url: "http://localhost:3000".to_string(),
                scan_path: "/api/attendance/scan".to_string(),
                health_path: "/api/health".to_string(),
                request_timeout: 15,
                probe_timeout_ms: 2_000,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 30,
                max_retry: 3,
                batch_size: 10,
                strategy: SyncStrategy::Fifo,
                max_record_age_hours: 24,
                backoff_base_ms: 1_000,
                backoff_max_ms: 60_000,
                item_delay_ms: 100,
                poor_connection_item_delay_ms: 500,
                history_limit: 20,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(v) = env_var("DATABASE_URL") {
            cfg.database.url = v;
        }
        if let Some(value) = env_var("DATABASE_MAX_CONNECTIONS").and_then(|v| parse_u32(&v)) {
            cfg.database.max_connections = value.max(1);
        }

        if let Some(v) = env_var("API_BASE_URL") {
            cfg.network.api_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = env_var("SCAN_PATH") {
            cfg.network.scan_path = v;
        }
        if let Some(v) = env_var("HEALTH_PATH") {
            cfg.network.health_path = v;
        }
        if let Some(value) = env_var("REQUEST_TIMEOUT").and_then(|v| parse_u64(&v)) {
            cfg.network.request_timeout = value.max(1);
        }
        if let Some(value) = env_var("PROBE_TIMEOUT_MS").and_then(|v| parse_u64(&v)) {
            cfg.network.probe_timeout_ms = value.max(1);
        }

        if let Some(v) = env_var("AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Some(value) = env_var("SYNC_INTERVAL").and_then(|v| parse_u64(&v)) {
            cfg.sync.sync_interval = value;
        }
        if let Some(value) = env_var("MAX_RETRY").and_then(|v| parse_u32(&v)) {
            cfg.sync.max_retry = value;
        }
        if let Some(value) = env_var("BATCH_SIZE").and_then(|v| parse_u32(&v)) {
            cfg.sync.batch_size = value;
        }
        if let Some(v) = env_var("SYNC_STRATEGY") {
            match v.parse::<SyncStrategy>() {
                Ok(strategy) => cfg.sync.strategy = strategy,
                Err(err) => tracing::warn!(value = %v, error = %err, "ignoring sync strategy"),
            }
        }
        if let Some(value) = env_var("MAX_RECORD_AGE_HOURS").and_then(|v| parse_u64(&v)) {
            cfg.sync.max_record_age_hours = value.max(1);
        }
        if let Some(value) = env_var("BACKOFF_BASE_MS").and_then(|v| parse_u64(&v)) {
            cfg.sync.backoff_base_ms = value;
        }
        if let Some(value) = env_var("BACKOFF_MAX_MS").and_then(|v| parse_u64(&v)) {
            cfg.sync.backoff_max_ms = value;
        }
        if let Some(value) = env_var("ITEM_DELAY_MS").and_then(|v| parse_u64(&v)) {
            cfg.sync.item_delay_ms = value;
        }
        if let Some(value) =
            env_var("POOR_CONNECTION_ITEM_DELAY_MS").and_then(|v| parse_u64(&v))
        {
            cfg.sync.poor_connection_item_delay_ms = value;
        }
        if let Some(value) = env_var("HISTORY_LIMIT").and_then(|v| parse_usize(&v)) {
            cfg.sync.history_limit = value.max(1);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.network.api_base_url.trim().is_empty() {
            return Err("Network api_base_url is required".to_string());
        }
        if !self.network.scan_path.starts_with('/') || !self.network.health_path.starts_with('/')
        {
            return Err("Network paths must start with '/'".to_string());
        }
        if self.sync.backoff_base_ms == 0 {
            return Err("Sync backoff_base_ms must be greater than 0".to_string());
        }
        if self.sync.backoff_max_ms < self.sync.backoff_base_ms {
            return Err("Sync backoff_max_ms must not be lower than backoff_base_ms".to_string());
        }
        if self.sync.history_limit == 0 {
            return Err("Sync history_limit must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn scan_url(&self) -> String {
        join_url(&self.network.api_base_url, &self.network.scan_path)
    }

    pub fn health_url(&self) -> String {
        join_url(&self.network.api_base_url, &self.network.health_path)
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_local_dir()
        .map(|dir| dir.join("attendance-sync"))
        .unwrap_or_else(|| PathBuf::from("./data"));
    format!("sqlite:{}", dir.join("queue.db").display())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}
