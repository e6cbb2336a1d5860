use crate::model::RecordType;
use crate::policy::{DEFAULT_ALLOWED, DEFAULT_LOCKED, RecordPolicy};
use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid TTL value: {0}")]
    InvalidTtl(String),

    #[error("Invalid SOA timer value: {0}")]
    InvalidSoaTimer(String),

    #[error("Unrecognized record type: {0}")]
    UnknownRecordType(String),
}

/// Process-wide configuration, loaded once at startup and immutable after
#[derive(Debug, Clone)]
pub struct ZoneConfig {
    /// Address to bind the HTTP API to
    pub bind_addr: SocketAddr,

    /// SQLite database URL
    pub database_url: String,

    /// Default TTL for records created without one
    pub default_ttl: u32,

    /// SOA primary nameserver
    pub soa_mname: String,

    /// SOA administrator contact
    pub soa_rname: String,

    /// Refresh interval of secondary servers
    pub soa_refresh: u32,

    /// Retry interval of secondary servers after a failed refresh
    pub soa_retry: u32,

    /// Delay before secondary servers stop answering
    pub soa_expire: u32,

    /// Time to live of SOA records
    pub soa_ttl: u32,

    /// Record types callers may create
    pub allowed_record_types: HashSet<RecordType>,

    /// System-managed record types immune to caller mutation
    pub locked_record_types: HashSet<RecordType>,

    /// Token signing secret
    pub secret_key: String,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080"
                .parse()
                .expect("Default bind address is valid"),
            database_url: "sqlite:zonekeeper.db".to_string(),
            default_ttl: 300,
            soa_mname: "ns.localhost.local".to_string(),
            soa_rname: "admin.localhost.local".to_string(),
            soa_refresh: 3600,
            soa_retry: 1800,
            soa_expire: 43200,
            soa_ttl: 3600,
            allowed_record_types: DEFAULT_ALLOWED.into_iter().collect(),
            locked_record_types: DEFAULT_LOCKED.into_iter().collect(),
            secret_key: "development".to_string(),
        }
    }
}

impl ZoneConfig {
    /// Create a ZoneConfig from environment variables.
    /// Returns Err if any provided value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(bind_addr) = std::env::var("ZONEKEEPER_BIND_ADDR") {
            config.bind_addr = bind_addr
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddress(bind_addr))?;
        }

        if let Ok(database_url) = std::env::var("ZONEKEEPER_DATABASE_URL") {
            config.database_url = database_url;
        }

        if let Ok(ttl) = std::env::var("ZONEKEEPER_DEFAULT_TTL") {
            config.default_ttl = ttl.parse().map_err(|_| ConfigError::InvalidTtl(ttl))?;
        }

        if let Ok(mname) = std::env::var("ZONEKEEPER_SOA_MNAME") {
            config.soa_mname = mname;
        }

        if let Ok(rname) = std::env::var("ZONEKEEPER_SOA_RNAME") {
            config.soa_rname = rname;
        }

        if let Ok(refresh) = std::env::var("ZONEKEEPER_SOA_REFRESH") {
            config.soa_refresh = refresh
                .parse()
                .map_err(|_| ConfigError::InvalidSoaTimer(refresh))?;
        }

        if let Ok(retry) = std::env::var("ZONEKEEPER_SOA_RETRY") {
            config.soa_retry = retry
                .parse()
                .map_err(|_| ConfigError::InvalidSoaTimer(retry))?;
        }

        if let Ok(expire) = std::env::var("ZONEKEEPER_SOA_EXPIRE") {
            config.soa_expire = expire
                .parse()
                .map_err(|_| ConfigError::InvalidSoaTimer(expire))?;
        }

        if let Ok(soa_ttl) = std::env::var("ZONEKEEPER_SOA_TTL") {
            config.soa_ttl = soa_ttl.parse().map_err(|_| ConfigError::InvalidTtl(soa_ttl))?;
        }

        if let Ok(allowed) = std::env::var("ZONEKEEPER_ALLOWED_RECORDS") {
            config.allowed_record_types = parse_record_types(&allowed)?;
        }

        if let Ok(locked) = std::env::var("ZONEKEEPER_LOCKED_RECORDS") {
            config.locked_record_types = parse_record_types(&locked)?;
        }

        if let Ok(secret) = std::env::var("ZONEKEEPER_SECRET_KEY") {
            config.secret_key = secret;
        }

        Ok(config)
    }

    /// Build the record policy from the configured type sets
    pub fn record_policy(&self) -> RecordPolicy {
        RecordPolicy::new(
            self.allowed_record_types.clone(),
            self.locked_record_types.clone(),
        )
    }

    /// SOA content a freshly created domain is seeded with (serial 1)
    pub fn initial_soa_content(&self) -> String {
        format!(
            "{} {} 1 {} {} {}",
            self.soa_mname, self.soa_rname, self.soa_refresh, self.soa_retry, self.soa_expire
        )
    }
}

/// Parse a comma-separated record type list
fn parse_record_types(list: &str) -> Result<HashSet<RecordType>, ConfigError> {
    list.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| RecordType::from_name(s).ok_or_else(|| ConfigError::UnknownRecordType(s.to_string())))
        .collect()
}
