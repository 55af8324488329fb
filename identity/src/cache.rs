//! Version- and time-bounded memo of successful verifications.

use agij_types::{Address, Role, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_CACHE_DURATION_SECS: u64 = 3600;

/// A remembered verification result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCacheEntry {
    pub verified: bool,
    pub timestamp: Timestamp,
    pub config_version: u64,
}

/// Caches positive identity checks per role.
///
/// Entries are never swept. A lookup treats an entry as a miss when its
/// `config_version` differs from the current version or its age reaches the
/// configured duration, so a version change invalidates everything at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCache {
    agents: HashMap<Address, AuthCacheEntry>,
    validators: HashMap<Address, AuthCacheEntry>,
    duration_secs: u64,
    version: u64,
}

impl Default for AuthorizationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DURATION_SECS)
    }
}

impl AuthorizationCache {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            agents: HashMap::new(),
            validators: HashMap::new(),
            duration_secs,
            version: 0,
        }
    }

    pub fn duration(&self) -> u64 {
        self.duration_secs
    }

    pub fn set_duration(&mut self, duration_secs: u64) {
        self.duration_secs = duration_secs;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Follow the identity configuration version. Never moves backwards.
    pub fn sync_version(&mut self, version: u64) {
        self.version = self.version.max(version);
    }

    /// `Some(true)` on a fresh hit, `None` otherwise.
    pub fn lookup(&self, role: Role, address: &Address, now: Timestamp) -> Option<bool> {
        let entry = self.map(role).get(address)?;
        if entry.config_version != self.version
            || entry.timestamp.has_expired(self.duration_secs, now)
        {
            tracing::debug!(%role, %address, "authorization cache miss (stale)");
            return None;
        }
        tracing::debug!(%role, %address, "authorization cache hit");
        Some(entry.verified)
    }

    /// Remember a successful verification at the current version.
    pub fn store(&mut self, role: Role, address: Address, now: Timestamp) {
        let entry = AuthCacheEntry {
            verified: true,
            timestamp: now,
            config_version: self.version,
        };
        self.map_mut(role).insert(address, entry);
    }

    pub fn entry(&self, role: Role, address: &Address) -> Option<&AuthCacheEntry> {
        self.map(role).get(address)
    }

    fn map(&self, role: Role) -> &HashMap<Address, AuthCacheEntry> {
        match role {
            Role::Agent => &self.agents,
            Role::Validator => &self.validators,
        }
    }

    fn map_mut(&mut self, role: Role) -> &mut HashMap<Address, AuthCacheEntry> {
        match role {
            Role::Agent => &mut self.agents,
            Role::Validator => &mut self.validators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn miss_when_absent() {
        let cache = AuthorizationCache::default();
        assert_eq!(cache.lookup(Role::Agent, &addr(1), Timestamp::new(10)), None);
    }

    #[test]
    fn hit_within_duration() {
        let mut cache = AuthorizationCache::new(100);
        cache.store(Role::Agent, addr(1), Timestamp::new(10));
        assert_eq!(cache.lookup(Role::Agent, &addr(1), Timestamp::new(109)), Some(true));
        assert_eq!(cache.lookup(Role::Agent, &addr(1), Timestamp::new(110)), None);
    }

    #[test]
    fn roles_are_separate() {
        let mut cache = AuthorizationCache::new(100);
        cache.store(Role::Validator, addr(1), Timestamp::new(0));
        assert_eq!(cache.lookup(Role::Agent, &addr(1), Timestamp::new(1)), None);
        assert_eq!(cache.lookup(Role::Validator, &addr(1), Timestamp::new(1)), Some(true));
    }

    #[test]
    fn version_change_invalidates_all() {
        let mut cache = AuthorizationCache::new(100);
        cache.store(Role::Agent, addr(1), Timestamp::new(0));
        cache.store(Role::Validator, addr(2), Timestamp::new(0));
        cache.sync_version(1);
        assert_eq!(cache.lookup(Role::Agent, &addr(1), Timestamp::new(1)), None);
        assert_eq!(cache.lookup(Role::Validator, &addr(2), Timestamp::new(1)), None);
        assert_eq!(cache.entry(Role::Agent, &addr(1)).map(|e| e.config_version), Some(0));
    }

    #[test]
    fn version_never_moves_backwards() {
        let mut cache = AuthorizationCache::default();
        cache.sync_version(5);
        cache.sync_version(3);
        assert_eq!(cache.version(), 5);
    }
}
