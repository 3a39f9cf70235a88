//! Live vendor approval/verification state.
//!
//! The cache is refreshed wholesale by an external poll and read as an
//! immutable snapshot by each ranking pass, so a refresh landing
//! mid-pass never mutates data the pass already read.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
    time::SystemTime,
};

use serde::Deserialize;

use super::normalize::normalize_name;
use super::quote::{ApprovalStatus, Quote, VerificationStatus};

/// Latest known state for one vendor, keyed by normalized display
/// name. A vendor absent from the map is unknown, never rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct VendorStatusEntry {
    pub approval: ApprovalStatus,
    pub is_verified: bool,
    pub updated_at: Option<SystemTime>,
}

/// One element of a refresh payload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VendorStatusUpdate {
    pub company_name: String,
    #[serde(default)]
    pub approval: ApprovalStatus,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub updated_at: Option<SystemTime>,
}

/// Read-only view of the cache taken at the start of a pass.
#[derive(Clone, Debug, Default)]
pub struct StatusSnapshot {
    entries: Arc<HashMap<String, VendorStatusEntry>>,
}

impl StatusSnapshot {
    /// Case-insensitive lookup on the trimmed display name.
    pub fn lookup(&self, company_name: &str) -> Option<&VendorStatusEntry> {
        self.entries.get(&normalize_name(company_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared, cloneable handle to the per-session status map. Refreshes
/// replace the whole map atomically; readers hold on to whichever
/// snapshot they took.
#[derive(Clone, Debug, Default)]
pub struct VendorStatusCache {
    inner: Arc<RwLock<Arc<HashMap<String, VendorStatusEntry>>>>,
}

impl VendorStatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire map. Vendors no longer reported simply
    /// disappear; there is no per-entry merge.
    pub fn refresh(&self, updates: Vec<VendorStatusUpdate>) {
        let mut entries = HashMap::with_capacity(updates.len());
        for update in updates {
            entries.insert(
                normalize_name(&update.company_name),
                VendorStatusEntry {
                    approval: update.approval,
                    is_verified: update.is_verified,
                    updated_at: update.updated_at,
                },
            );
        }
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(entries);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        StatusSnapshot {
            entries: Arc::clone(&guard),
        }
    }
}

/// Resolves the verification badge for one quote, most to least
/// authoritative: special vendors are always verified, then the live
/// cache, then the status fields embedded in the calculation response,
/// then unknown. The layered fallback covers vendors the asynchronous
/// status poll has not reported yet.
pub fn resolve_verification(
    quote: &Quote,
    snapshot: &StatusSnapshot,
    special_vendor_names: &[String],
) -> VerificationStatus {
    let name = normalize_name(&quote.company_name);
    if quote.is_special_vendor
        || special_vendor_names
            .iter()
            .any(|special| normalize_name(special) == name)
    {
        return VerificationStatus::Verified;
    }

    if let Some(entry) = snapshot.lookup(&quote.company_name) {
        return if entry.is_verified {
            VerificationStatus::Verified
        } else {
            // Approved-but-unverified, pending and rejected all render
            // as unverified; absence is the only path to unknown.
            VerificationStatus::Unverified
        };
    }

    if quote.is_verified == Some(true) {
        return VerificationStatus::Verified;
    }
    if quote.approval_status.is_some() || quote.is_verified == Some(false) {
        return VerificationStatus::Unverified;
    }

    VerificationStatus::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::normalize::normalize;
    use crate::domain::quote::{Partition, RawQuote};

    fn quote(raw: RawQuote) -> Quote {
        normalize(&raw, Partition::Available).expect("test quote")
    }

    fn update(name: &str, approval: ApprovalStatus, verified: bool) -> VendorStatusUpdate {
        VendorStatusUpdate {
            company_name: name.to_string(),
            approval,
            is_verified: verified,
            updated_at: None,
        }
    }

    #[test]
    fn refresh_replaces_the_whole_map() {
        let cache = VendorStatusCache::new();
        cache.refresh(vec![update("Acme", ApprovalStatus::Approved, true)]);
        cache.refresh(vec![update("Zephyr", ApprovalStatus::Pending, false)]);

        let snap = cache.snapshot();
        assert!(snap.lookup("Acme").is_none());
        assert!(snap.lookup("zephyr ").is_some());
    }

    #[test]
    fn snapshots_are_isolated_from_later_refreshes() {
        let cache = VendorStatusCache::new();
        cache.refresh(vec![update("Acme", ApprovalStatus::Approved, true)]);
        let before = cache.snapshot();

        cache.refresh(Vec::new());
        assert!(before.lookup("Acme").is_some());
        assert!(cache.snapshot().lookup("Acme").is_none());
    }

    #[test]
    fn cache_entry_outranks_embedded_status() {
        let cache = VendorStatusCache::new();
        cache.refresh(vec![update("Acme", ApprovalStatus::Pending, false)]);

        let mut q = quote(RawQuote::new("Acme", 100.0));
        q.is_verified = Some(true);
        assert_eq!(
            resolve_verification(&q, &cache.snapshot(), &[]),
            VerificationStatus::Unverified
        );
    }

    #[test]
    fn approved_without_verification_is_unverified() {
        let cache = VendorStatusCache::new();
        cache.refresh(vec![update("Acme", ApprovalStatus::Approved, false)]);

        let q = quote(RawQuote::new("Acme", 100.0));
        assert_eq!(
            resolve_verification(&q, &cache.snapshot(), &[]),
            VerificationStatus::Unverified
        );
    }

    #[test]
    fn embedded_status_fills_in_for_missing_cache_entries() {
        let snap = VendorStatusCache::new().snapshot();

        let mut q = quote(RawQuote::new("Acme", 100.0));
        q.is_verified = Some(true);
        assert_eq!(
            resolve_verification(&q, &snap, &[]),
            VerificationStatus::Verified
        );

        let mut q = quote(RawQuote::new("Acme", 100.0));
        q.approval_status = Some(ApprovalStatus::Rejected);
        assert_eq!(
            resolve_verification(&q, &snap, &[]),
            VerificationStatus::Unverified
        );
    }

    #[test]
    fn no_status_anywhere_resolves_to_unknown() {
        let snap = VendorStatusCache::new().snapshot();
        let q = quote(RawQuote::new("Acme", 100.0));
        assert_eq!(
            resolve_verification(&q, &snap, &[]),
            VerificationStatus::Unknown
        );
    }

    #[test]
    fn special_vendors_are_always_verified() {
        let cache = VendorStatusCache::new();
        cache.refresh(vec![update("Local FTL", ApprovalStatus::Rejected, false)]);

        let mut q = quote(RawQuote::new("Local FTL", 100.0));
        q.is_special_vendor = true;
        assert_eq!(
            resolve_verification(&q, &cache.snapshot(), &[]),
            VerificationStatus::Verified
        );

        // Also by name, via the configured special-vendor list.
        let q = quote(RawQuote::new("Partner FTL", 100.0));
        let names = vec!["Partner FTL".to_string()];
        assert_eq!(
            resolve_verification(&q, &cache.snapshot(), &names),
            VerificationStatus::Verified
        );
    }
}
