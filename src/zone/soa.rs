//! SOA record content handling
//!
//! SOA content is stored as a space-separated string:
//! `mname rname serial refresh retry expire [trailing...]`. The serial is
//! the zone version; everything after it is preserved verbatim across
//! serial bumps.

use crate::error::{Result, ZoneError};
use std::fmt;

/// Parsed SOA record content
#[derive(Debug, Clone, PartialEq)]
pub struct SoaContent {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    /// Fields after the serial (refresh, retry, expire, optional remainder),
    /// carried verbatim
    tail: Vec<String>,
}

impl SoaContent {
    /// Parse SOA content. Anything that does not look like a full SOA
    /// string is corrupt state, not caller error.
    pub fn parse(content: &str) -> Result<Self> {
        let parts: Vec<&str> = content.split_whitespace().collect();
        if parts.len() < 6 {
            return Err(ZoneError::CorruptState(format!(
                "SOA content has {} fields, expected at least 6: {:?}",
                parts.len(),
                content
            )));
        }

        let serial = parts[2].parse().map_err(|_| {
            ZoneError::CorruptState(format!("SOA serial is not an integer: {}", parts[2]))
        })?;

        Ok(Self {
            mname: parts[0].to_string(),
            rname: parts[1].to_string(),
            serial,
            tail: parts[3..].iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Increment the serial by exactly 1, wrapping per RFC 1982
    pub fn bump(&mut self) {
        self.serial = self.serial.wrapping_add(1);
    }
}

impl fmt::Display for SoaContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.mname,
            self.rname,
            self.serial,
            self.tail.join(" ")
        )
    }
}
