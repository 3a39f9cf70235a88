//! Domain logic for quote aggregation and ranking lives here.

pub mod normalize;
pub mod pipeline;
pub mod policy;
pub mod quote;
pub mod special;
pub mod status;

pub use normalize::{normalize, resolve_eta, resolve_price, resolve_vendor_key};
pub use pipeline::{QuoteEngine, BEST_VALUE_TOLERANCE};
pub use policy::{reclassify, EnginePolicy, DEFAULT_FTL_WEIGHT_THRESHOLD_KG};
pub use quote::{
    ApprovalStatus, CalcRequest, FilterSettings, Partition, Quote, RankedQuotes, RawNumber,
    RawQuote, ShipmentProfile, SortCriterion, TransportMode, VerificationStatus,
};
pub use special::{
    inject_special_quotes, meets_ftl_weight, FlatRateSlab, FlatRateTable, FtlRate, FtlRateSource,
    FtlVendor, NoFtlRates, LOCAL_FTL_NAME, PARTNER_FTL_NAME,
};
pub use status::{
    resolve_verification, StatusSnapshot, VendorStatusCache, VendorStatusEntry, VendorStatusUpdate,
};
