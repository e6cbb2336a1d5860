//! Record-type policy
//!
//! Two independently configured sets decide what callers may do: the
//! *allowed* set is what a caller may request at creation, the *locked* set
//! is system-owned types immune to caller create/update/delete. Locked
//! types are excluded from creation regardless of the allowed set.

use crate::model::RecordType;
use std::collections::HashSet;

/// Record types callers may create by default
pub const DEFAULT_ALLOWED: [RecordType; 6] = [
    RecordType::CNAME,
    RecordType::A,
    RecordType::AAAA,
    RecordType::TXT,
    RecordType::NS,
    RecordType::SRV,
];

/// System-managed record types
pub const DEFAULT_LOCKED: [RecordType; 1] = [RecordType::SOA];

/// Pure policy decisions over record types; never touches the store
#[derive(Debug, Clone)]
pub struct RecordPolicy {
    allowed: HashSet<RecordType>,
    locked: HashSet<RecordType>,
}

impl RecordPolicy {
    pub fn new(allowed: HashSet<RecordType>, locked: HashSet<RecordType>) -> Self {
        Self { allowed, locked }
    }

    /// Check if a caller may create records of this type
    pub fn can_create(&self, rtype: RecordType) -> bool {
        self.allowed.contains(&rtype) && !self.locked.contains(&rtype)
    }

    /// Check if this type is system-owned and immune to caller mutation
    pub fn is_locked(&self, rtype: RecordType) -> bool {
        self.locked.contains(&rtype)
    }

    /// Creatable type names, sorted, for error messages
    pub fn allowed_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .allowed
            .iter()
            .filter(|t| !self.locked.contains(t))
            .map(|t| t.name())
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for RecordPolicy {
    fn default() -> Self {
        Self {
            allowed: DEFAULT_ALLOWED.into_iter().collect(),
            locked: DEFAULT_LOCKED.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowed() {
        let policy = RecordPolicy::default();
        assert!(policy.can_create(RecordType::A));
        assert!(policy.can_create(RecordType::CNAME));
        assert!(policy.can_create(RecordType::SRV));
        assert!(!policy.can_create(RecordType::MX));
    }

    #[test]
    fn test_soa_locked() {
        let policy = RecordPolicy::default();
        assert!(policy.is_locked(RecordType::SOA));
        assert!(!policy.can_create(RecordType::SOA));
        assert!(!policy.is_locked(RecordType::A));
    }

    #[test]
    fn test_locked_overrides_allowed() {
        // Misconfigured: SOA in both sets. Locked wins.
        let allowed = [RecordType::A, RecordType::SOA].into_iter().collect();
        let locked = [RecordType::SOA].into_iter().collect();
        let policy = RecordPolicy::new(allowed, locked);
        assert!(!policy.can_create(RecordType::SOA));
        assert!(policy.can_create(RecordType::A));
    }

    #[test]
    fn test_allowed_names_sorted() {
        let policy = RecordPolicy::default();
        assert_eq!(
            policy.allowed_names(),
            vec!["A", "AAAA", "CNAME", "NS", "SRV", "TXT"]
        );
    }
}
