//! Quote aggregation and ranking engine for a freight-rate comparison
//! tool.
//!
//! Given a customer's contracted carrier quotes and the pool of
//! publicly available ones, [`QuoteEngine::recompute`] merges,
//! deduplicates, reclassifies, filters, ranks and annotates them into
//! two stable lists for presentation. The engine is synchronous and
//! stateless per pass; the only session state is the
//! [`VendorStatusCache`], refreshed by the background
//! [`infra::StatusPoller`].

pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{
    CalcRequest, EnginePolicy, FilterSettings, FlatRateTable, FtlRateSource, Partition, Quote,
    QuoteEngine, RankedQuotes, RawQuote, ShipmentProfile, SortCriterion, VendorStatusCache,
    VendorStatusUpdate, VerificationStatus,
};
