//! Configuration system for lanshare.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $LANSHARE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/lanshare/config.toml
//!   3. ~/.config/lanshare/config.toml

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::wire::{DEFAULT_TTL, DISCOVERY_PORT, MESSAGE_PORT};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanshareConfig {
    pub identity: IdentityConfig,
    pub network: NetworkConfig,
    pub discovery: DiscoveryConfig,
    pub search: SearchConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Address advertised to peers. Empty = resolve from the routing table.
    pub advertise_addr: String,
    /// External address used only to select the outbound interface.
    /// Nothing is ever sent to it.
    pub probe_addr: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the message and discovery listeners bind to.
    pub bind_addr: IpAddr,
    /// TCP port for SEARCH / FOUND / SYNC_PEERS.
    pub message_port: u16,
    /// UDP port for presence beacons.
    pub discovery_port: u16,
    /// Local JSON API port.
    pub api_port: u16,
    /// Destination for beacons.
    pub broadcast_addr: Ipv4Addr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Broadcast and listen for beacons. Off = peers only via gossip.
    pub enabled: bool,
    /// Beacon interval is drawn uniformly from [min, max].
    pub interval_min_ms: u64,
    pub interval_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hop budget for searches issued by this node.
    pub default_ttl: u32,
    /// Bound on connect and on write for every outbound message.
    pub send_timeout_ms: u64,
    /// Bound on reading the single inbound message of a connection.
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory whose files this node answers searches for.
    pub share_dir: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            advertise_addr: String::new(),
            probe_addr: SocketAddr::from(([8, 8, 8, 8], 80)),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            message_port: MESSAGE_PORT,
            discovery_port: DISCOVERY_PORT,
            api_port: 8000,
            broadcast_addr: Ipv4Addr::BROADCAST,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_min_ms: 5_000,
            interval_max_ms: 10_000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            send_timeout_ms: 2_000,
            read_timeout_ms: 2_000,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            share_dir: data_dir().join("shared_files"),
        }
    }
}

impl SearchConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl DiscoveryConfig {
    pub fn interval_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.interval_min_ms),
            Duration::from_millis(self.interval_max_ms),
        )
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("lanshare")
}

pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("lanshare")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl LanshareConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            Self::from_toml(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            LanshareConfig::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("LANSHARE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&LanshareConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Reject settings the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.default_ttl == 0 {
            return Err(ConfigError::Invalid("search.default_ttl must be at least 1".into()));
        }
        if self.search.send_timeout_ms == 0 || self.search.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid("search timeouts must be non-zero".into()));
        }
        if self.discovery.interval_min_ms > self.discovery.interval_max_ms {
            return Err(ConfigError::Invalid(format!(
                "discovery interval window is inverted: {} > {}",
                self.discovery.interval_min_ms, self.discovery.interval_max_ms
            )));
        }
        if !self.identity.advertise_addr.is_empty()
            && self.identity.advertise_addr.parse::<IpAddr>().is_err()
        {
            return Err(ConfigError::Invalid(format!(
                "identity.advertise_addr '{}' is not an IP address",
                self.identity.advertise_addr
            )));
        }
        Ok(())
    }

    /// Apply LANSHARE_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("LANSHARE_IDENTITY__ADVERTISE_ADDR") {
            self.identity.advertise_addr = v;
        }
        if let Some(p) = lookup("LANSHARE_NETWORK__MESSAGE_PORT").and_then(|v| v.parse().ok()) {
            self.network.message_port = p;
        }
        if let Some(p) = lookup("LANSHARE_NETWORK__DISCOVERY_PORT").and_then(|v| v.parse().ok()) {
            self.network.discovery_port = p;
        }
        if let Some(p) = lookup("LANSHARE_NETWORK__API_PORT").and_then(|v| v.parse().ok()) {
            self.network.api_port = p;
        }
        if let Some(v) = lookup("LANSHARE_DISCOVERY__ENABLED") {
            self.discovery.enabled = v == "true" || v == "1";
        }
        if let Some(t) = lookup("LANSHARE_SEARCH__DEFAULT_TTL").and_then(|v| v.parse().ok()) {
            self.search.default_ttl = t;
        }
        if let Some(t) = lookup("LANSHARE_SEARCH__SEND_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.search.send_timeout_ms = t;
        }
        if let Some(t) = lookup("LANSHARE_SEARCH__READ_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.search.read_timeout_ms = t;
        }
        if let Some(v) = lookup("LANSHARE_CATALOG__SHARE_DIR") {
            self.catalog.share_dir = PathBuf::from(v);
        }
    }
}
