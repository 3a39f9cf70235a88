//! The recomputation pass: merge, dedup, filter, rank, annotate.
//!
//! One pass is a pure function of the raw quote lists, the status
//! snapshot, the filter/sort settings and the active customer. Nothing
//! here is fatal; a pass always ends with two (possibly empty) lists.

use std::collections::HashSet;

use tracing::debug;

use super::normalize::normalize;
use super::policy::{reclassify, EnginePolicy};
use super::quote::{
    CalcRequest, FilterSettings, Partition, Quote, RankedQuotes, SortCriterion,
};
use super::special::{
    inject_special_quotes, meets_ftl_weight, FtlRateSource, LOCAL_FTL_NAME, PARTNER_FTL_NAME,
};
use super::status::{resolve_verification, VendorStatusCache};
use crate::util::natural::natural_cmp;

/// Absolute price tolerance for the best-value flag.
pub const BEST_VALUE_TOLERANCE: f64 = 0.01;

/// The aggregation and ranking engine. Stateless between passes except
/// for the vendor-status cache, which lives for the session and is
/// refreshed by an external poller.
#[derive(Clone, Debug, Default)]
pub struct QuoteEngine {
    policy: EnginePolicy,
    status: VendorStatusCache,
}

impl QuoteEngine {
    pub fn new(policy: EnginePolicy) -> Self {
        Self {
            policy,
            status: VendorStatusCache::new(),
        }
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    /// Cloneable handle for the background status poller.
    pub fn status_cache(&self) -> VendorStatusCache {
        self.status.clone()
    }

    /// Runs one full recomputation pass. The status snapshot is taken
    /// once up front; a refresh landing mid-pass is not observed.
    pub fn recompute(&self, request: &CalcRequest, ftl_source: &dyn FtlRateSource) -> RankedQuotes {
        let snapshot = self.status.snapshot();

        let raw_total = request.contracted.len() + request.available.len();
        let mut pool: Vec<Quote> = request
            .contracted
            .iter()
            .filter_map(|raw| normalize(raw, Partition::Contracted))
            .collect();
        // Injected quotes go ahead of the upstream Available quotes so
        // they win dedup ties within their partition.
        pool.extend(inject_special_quotes(
            &request.shipment,
            &self.policy,
            ftl_source,
        ));
        pool.extend(
            request
                .available
                .iter()
                .filter_map(|raw| normalize(raw, Partition::Available)),
        );
        debug!(
            raw = raw_total,
            normalized = pool.len(),
            "normalized quote pool"
        );

        reclassify(&self.policy, request.customer_id.as_deref(), &mut pool);

        let (mut contracted, mut available) = split_partitions(pool);
        let mut seen = HashSet::new();
        dedup_in_place(&mut contracted, &mut seen);
        dedup_in_place(&mut available, &mut seen);

        retain_eligible(&mut contracted, &request.filters, &self.policy);
        retain_eligible(&mut available, &request.filters, &self.policy);

        for quote in contracted.iter_mut().chain(available.iter_mut()) {
            quote.verification =
                resolve_verification(quote, &snapshot, &self.policy.special_vendor_names);
        }

        sort_partition(&mut contracted, request.sort);
        sort_partition(&mut available, request.sort);

        let mut ranked = RankedQuotes {
            contracted,
            available,
        };
        annotate(&mut ranked);
        debug!(
            contracted = ranked.contracted.len(),
            available = ranked.available.len(),
            "recomputation pass complete"
        );
        ranked
    }

}

/// Splits the pool into the two partitions, keeping relative order but
/// moving special-vendor quotes ahead of upstream ones within each
/// partition (dedup processing order).
fn split_partitions(pool: Vec<Quote>) -> (Vec<Quote>, Vec<Quote>) {
    let mut contracted = Vec::new();
    let mut available = Vec::new();
    for quote in pool {
        match quote.partition {
            Partition::Contracted => contracted.push(quote),
            Partition::Available => available.push(quote),
        }
    }
    contracted.sort_by_key(|q| !q.is_special_vendor);
    available.sort_by_key(|q| !q.is_special_vendor);
    (contracted, available)
}

/// First occurrence per vendor key wins; the seen-set spans both
/// partitions (Contracted is processed first), so a vendor never shows
/// up in both output lists. A missing key keeps the quote
/// unconditionally.
fn dedup_in_place(partition: &mut Vec<Quote>, seen: &mut HashSet<String>) {
    partition.retain(|quote| match &quote.vendor_key {
        Some(key) => seen.insert(key.clone()),
        None => true,
    });
}

fn is_ftl_quote(quote: &Quote) -> bool {
    quote.company_name.eq_ignore_ascii_case(LOCAL_FTL_NAME)
        || quote.company_name.eq_ignore_ascii_case(PARTNER_FTL_NAME)
}

/// Applies the user ceilings plus the defensive invariant checks.
fn retain_eligible(partition: &mut Vec<Quote>, filters: &FilterSettings, policy: &EnginePolicy) {
    let before = partition.len();
    partition.retain(|quote| {
        // Re-checked even though the normalizer enforces it.
        if !quote.price.is_finite() || quote.price <= 0.0 {
            return false;
        }
        if !filters.matches(quote) {
            return false;
        }
        // FTL products must clear the weight gate regardless of how
        // they were constructed.
        if is_ftl_quote(quote)
            && !meets_ftl_weight(
                quote.actual_weight,
                quote.volumetric_weight,
                policy.ftl_weight_threshold_kg,
            )
        {
            return false;
        }
        true
    });
    if partition.len() != before {
        debug!(removed = before - partition.len(), "quotes filtered out");
    }
}

/// Orders one partition by the active criterion. All sorts are stable,
/// so unspecified tie-breaks preserve input order.
fn sort_partition(partition: &mut [Quote], sort: SortCriterion) {
    match sort {
        SortCriterion::Price => partition.sort_by(|a, b| {
            a.price
                .partial_cmp(&b.price)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| natural_cmp(&a.company_name, &b.company_name))
        }),
        // Hidden quotes always sort after visible ones under the time
        // criterion; redaction deliberately leaks into order here.
        SortCriterion::Time => {
            partition.sort_by_key(|quote| (quote.is_hidden, quote.estimated_days));
        }
        SortCriterion::Rating => partition.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

/// Flags every quote within tolerance of the global minimum price as
/// best value, and the single fastest non-hidden quote. Flags never
/// affect membership or order.
fn annotate(ranked: &mut RankedQuotes) {
    let min_price = ranked
        .iter_all()
        .map(|quote| quote.price)
        .fold(f64::INFINITY, f64::min);

    let fastest_id = ranked
        .iter_all()
        .filter(|quote| !quote.is_hidden)
        .min_by_key(|quote| quote.estimated_days)
        .map(|quote| quote.id.clone());

    for quote in ranked
        .contracted
        .iter_mut()
        .chain(ranked.available.iter_mut())
    {
        quote.best_value = (quote.price - min_price).abs() <= BEST_VALUE_TOLERANCE;
        quote.fastest = fastest_id.as_deref() == Some(quote.id.as_str());
    }
}
