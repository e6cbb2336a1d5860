//! DNS name validation
//!
//! Every name that enters the system (domain names, record names, token
//! namespaces) passes through `validate_name` before anything is written.

use crate::error::{Result, ZoneError};

/// Maximum total length of a DNS name in bytes
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of a single label
pub const MAX_LABEL_LENGTH: usize = 63;

/// Validate a DNS name against label grammar.
///
/// A valid name is one or more dot-separated labels, each 1-63 characters of
/// ASCII alphanumerics with interior hyphens, no longer than 255 bytes in
/// total. Length and syntax violations report distinct error variants.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ZoneError::InvalidName("name is empty".to_string()));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ZoneError::NameTooLong(name.len()));
    }

    // Split never yields zero items, and empty labels (leading/trailing dot,
    // "..") fail the per-label checks below.
    for label in name.split('.') {
        validate_label(label)?;
    }

    Ok(())
}

fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(ZoneError::InvalidName("empty label".to_string()));
    }

    if label.len() > MAX_LABEL_LENGTH {
        return Err(ZoneError::InvalidName(format!(
            "label exceeds {} characters: {}",
            MAX_LABEL_LENGTH, label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(ZoneError::InvalidName(format!(
            "label starts or ends with a hyphen: {}",
            label
        )));
    }

    for c in label.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ZoneError::InvalidName(format!(
                "label contains invalid character {:?}: {}",
                c, label
            )));
        }
    }

    Ok(())
}
