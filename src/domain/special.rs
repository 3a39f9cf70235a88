//! Client-injected synthetic full-truck-load quotes.
//!
//! These never come from the main rate engine; they are built from a
//! separate flat-rate source and merged into the Available pool. A
//! quote that fails the weight gate is never constructed at all.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::policy::EnginePolicy;
use super::quote::{
    Partition, Quote, ShipmentProfile, TransportMode, VerificationStatus,
};

pub const LOCAL_FTL_NAME: &str = "Local FTL";
pub const PARTNER_FTL_NAME: &str = "Partner FTL";

/// Which of the two synthetic vendors a rate is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FtlVendor {
    Local,
    Partner,
}

impl FtlVendor {
    pub fn company_name(&self) -> &'static str {
        match self {
            Self::Local => LOCAL_FTL_NAME,
            Self::Partner => PARTNER_FTL_NAME,
        }
    }
}

/// A flat rate returned by the external source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FtlRate {
    pub price: f64,
    pub transit_days: Option<u32>,
}

/// External flat-rate source keyed by vendor, transport mode, distance
/// and shipment weight. `None` (or any upstream failure mapped to
/// `None`) means "inject nothing" for that vendor.
pub trait FtlRateSource {
    fn flat_rate(
        &self,
        vendor: FtlVendor,
        mode: TransportMode,
        distance_km: f64,
        weight_kg: f64,
    ) -> Option<FtlRate>;
}

/// Source with no rates; injects nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFtlRates;

impl FtlRateSource for NoFtlRates {
    fn flat_rate(&self, _: FtlVendor, _: TransportMode, _: f64, _: f64) -> Option<FtlRate> {
        None
    }
}

/// One distance slab of a flat-rate table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatRateSlab {
    pub vendor: FtlVendor,
    pub mode: TransportMode,
    /// Slab applies up to and including this distance.
    pub max_distance_km: f64,
    pub price: f64,
    #[serde(default)]
    pub transit_days: Option<u32>,
}

/// In-memory flat-rate table, typically loaded once from the rate API
/// and handed to the engine for the session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatRateTable {
    slabs: Vec<FlatRateSlab>,
}

impl FlatRateTable {
    pub fn new(slabs: Vec<FlatRateSlab>) -> Self {
        Self { slabs }
    }

    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }
}

impl FtlRateSource for FlatRateTable {
    fn flat_rate(
        &self,
        vendor: FtlVendor,
        mode: TransportMode,
        distance_km: f64,
        _weight_kg: f64,
    ) -> Option<FtlRate> {
        // Tightest slab covering the distance wins.
        self.slabs
            .iter()
            .filter(|slab| {
                slab.vendor == vendor && slab.mode == mode && slab.max_distance_km >= distance_km
            })
            .min_by(|a, b| {
                a.max_distance_km
                    .partial_cmp(&b.max_distance_km)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|slab| FtlRate {
                price: slab.price,
                transit_days: slab.transit_days,
            })
    }
}

/// Actual-or-volumetric weight gate shared by the injector and the
/// defensive re-check in the filter stage.
pub fn meets_ftl_weight(
    actual_weight: Option<f64>,
    volumetric_weight: Option<f64>,
    threshold_kg: f64,
) -> bool {
    actual_weight.is_some_and(|w| w >= threshold_kg)
        || volumetric_weight.is_some_and(|w| w >= threshold_kg)
}

/// Builds zero, one or two synthetic quotes for the shipment. Each is
/// marked special-vendor and placed in Available; reclassification may
/// move it later, filtering re-checks the weight gate.
pub fn inject_special_quotes(
    profile: &ShipmentProfile,
    policy: &EnginePolicy,
    source: &dyn FtlRateSource,
) -> Vec<Quote> {
    let candidates = [
        (FtlVendor::Local, policy.local_ftl_enabled),
        (FtlVendor::Partner, policy.partner_ftl_enabled),
    ];

    let mut injected = Vec::new();
    for (vendor, enabled) in candidates {
        if !enabled {
            continue;
        }
        if !meets_ftl_weight(
            profile.actual_weight,
            profile.volumetric_weight,
            policy.ftl_weight_threshold_kg,
        ) {
            continue;
        }
        let weight = profile
            .actual_weight
            .unwrap_or(0.0)
            .max(profile.volumetric_weight.unwrap_or(0.0));
        let Some(rate) = source.flat_rate(vendor, profile.mode, profile.distance_km, weight)
        else {
            continue;
        };
        if !rate.price.is_finite() || rate.price <= 0.0 {
            debug!("skipping {} flat rate with unusable price", vendor.company_name());
            continue;
        }

        injected.push(Quote {
            id: Uuid::new_v4().to_string(),
            vendor_key: Some(vendor.company_name().to_lowercase()),
            company_name: vendor.company_name().to_string(),
            price: rate.price,
            estimated_days: rate.transit_days.unwrap_or(1).max(1),
            rating: 0.0,
            partition: Partition::Available,
            is_special_vendor: true,
            is_hidden: false,
            actual_weight: profile.actual_weight,
            volumetric_weight: profile.volumetric_weight,
            approval_status: None,
            is_verified: Some(true),
            best_value: false,
            fastest: false,
            verification: VerificationStatus::Verified,
        });
    }
    injected
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRates;

    impl FtlRateSource for FixedRates {
        fn flat_rate(
            &self,
            vendor: FtlVendor,
            _mode: TransportMode,
            _distance_km: f64,
            _weight_kg: f64,
        ) -> Option<FtlRate> {
            match vendor {
                FtlVendor::Local => Some(FtlRate {
                    price: 7200.0,
                    transit_days: Some(3),
                }),
                FtlVendor::Partner => Some(FtlRate {
                    price: 6900.0,
                    transit_days: None,
                }),
            }
        }
    }

    fn heavy_profile() -> ShipmentProfile {
        ShipmentProfile {
            mode: TransportMode::Surface,
            distance_km: 420.0,
            actual_weight: Some(650.0),
            volumetric_weight: Some(120.0),
        }
    }

    #[test]
    fn injects_both_vendors_for_eligible_shipments() {
        let quotes =
            inject_special_quotes(&heavy_profile(), &EnginePolicy::default(), &FixedRates);
        assert_eq!(quotes.len(), 2);
        assert!(quotes.iter().all(|q| q.is_special_vendor));
        assert!(quotes.iter().all(|q| q.partition == Partition::Available));
        // Missing transit days falls back to the 1-day floor.
        assert_eq!(quotes[1].estimated_days, 1);
    }

    #[test]
    fn underweight_shipment_constructs_nothing() {
        let profile = ShipmentProfile {
            actual_weight: Some(400.0),
            volumetric_weight: Some(450.0),
            ..heavy_profile()
        };
        assert!(inject_special_quotes(&profile, &EnginePolicy::default(), &FixedRates).is_empty());

        // Volumetric weight alone can qualify, inclusive of threshold.
        let profile = ShipmentProfile {
            actual_weight: Some(400.0),
            volumetric_weight: Some(500.0),
            ..heavy_profile()
        };
        assert_eq!(
            inject_special_quotes(&profile, &EnginePolicy::default(), &FixedRates).len(),
            2
        );
    }

    #[test]
    fn feature_gates_disable_individual_vendors() {
        let policy = EnginePolicy {
            partner_ftl_enabled: false,
            ..EnginePolicy::default()
        };
        let quotes = inject_special_quotes(&heavy_profile(), &policy, &FixedRates);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].company_name, LOCAL_FTL_NAME);
    }

    #[test]
    fn missing_rates_inject_nothing() {
        assert!(
            inject_special_quotes(&heavy_profile(), &EnginePolicy::default(), &NoFtlRates)
                .is_empty()
        );
    }

    #[test]
    fn flat_rate_table_picks_the_tightest_slab() {
        let table = FlatRateTable::new(vec![
            FlatRateSlab {
                vendor: FtlVendor::Local,
                mode: TransportMode::Surface,
                max_distance_km: 1000.0,
                price: 9500.0,
                transit_days: Some(5),
            },
            FlatRateSlab {
                vendor: FtlVendor::Local,
                mode: TransportMode::Surface,
                max_distance_km: 500.0,
                price: 7200.0,
                transit_days: Some(3),
            },
        ]);

        let rate = table
            .flat_rate(FtlVendor::Local, TransportMode::Surface, 420.0, 650.0)
            .expect("slab covers distance");
        assert_eq!(rate.price, 7200.0);

        assert!(table
            .flat_rate(FtlVendor::Local, TransportMode::Surface, 1200.0, 650.0)
            .is_none());
        assert!(table
            .flat_rate(FtlVendor::Partner, TransportMode::Surface, 420.0, 650.0)
            .is_none());
    }
}
