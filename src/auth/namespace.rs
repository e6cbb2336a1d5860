//! Namespace claim matching
//!
//! A claim grants authority over any domain whose rightmost labels equal the
//! claim exactly, label for label, or over every domain if it is the
//! wildcard. `granted` is the filtering form used to hide unauthorized
//! domains from listings; `ensure` is the enforcing form guarding mutations.

use crate::auth::WILDCARD;
use crate::error::{Result, ZoneError};

/// Check if the namespace claim covers the domain.
pub fn granted(claim: &str, domain: &str) -> bool {
    if claim == WILDCARD {
        return true;
    }

    let claim_labels = claim.split('.').count();
    let labels: Vec<&str> = domain.split('.').collect();

    // A claim with more labels than the domain never grants.
    if labels.len() < claim_labels {
        return false;
    }

    labels[labels.len() - claim_labels..].join(".") == claim
}

/// Enforcing check: error on denial.
pub fn ensure(claim: &str, domain: &str) -> Result<()> {
    if granted(claim, domain) {
        Ok(())
    } else {
        Err(ZoneError::Forbidden(format!(
            "namespace does not cover domain {}",
            domain
        )))
    }
}
