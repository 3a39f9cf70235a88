//! Canonical entities for the quote comparison engine.

use serde::{Deserialize, Serialize};

/// Which output list a quote belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    /// Carriers the active customer has a direct contract with.
    Contracted,
    /// All other serviceable carriers.
    #[default]
    Available,
}

/// Vendor approval state as reported by the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Resolved verification state shown next to a quote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Unverified,
    #[default]
    Unknown,
}

/// One carrier's offer, normalized and annotated for presentation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Quote {
    /// Fresh per-pass key for presentation lists.
    pub id: String,
    /// Stable identity used for dedup and status lookup.
    /// Prefers the vendor record id, falls back to the lowercased
    /// display name. `None` disables dedup for this quote.
    pub vendor_key: Option<String>,
    pub company_name: String,
    /// Resolved price; always finite and > 0 once normalized.
    pub price: f64,
    /// Whole days, always >= 1.
    pub estimated_days: u32,
    /// Vendor rating in [0, 5]; 0 when the source reports none.
    pub rating: f64,
    pub partition: Partition,
    /// True for client-injected synthetic FTL quotes.
    pub is_special_vendor: bool,
    /// Presentation-only redaction flag; never affects filtering.
    pub is_hidden: bool,
    pub actual_weight: Option<f64>,
    pub volumetric_weight: Option<f64>,
    /// Status fields embedded in the original calculation response,
    /// used as a fallback when the live status cache lags.
    pub approval_status: Option<ApprovalStatus>,
    pub is_verified: Option<bool>,
    // Output annotations, set at the end of a pass.
    pub best_value: bool,
    pub fastest: bool,
    pub verification: VerificationStatus,
}

/// A numeric field as the rate engine actually sends it: a number, or
/// a string with currency symbols and thousands separators.
#[derive(Clone, Debug, PartialEq)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for RawNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct NumberOrText;

        impl<'de> serde::de::Visitor<'de> for NumberOrText {
            type Value = RawNumber;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number or a numeric string")
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawNumber::Number(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawNumber::Number(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawNumber::Number(value as f64))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawNumber::Text(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawNumber::Text(value))
            }
        }

        deserializer.deserialize_any(NumberOrText)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// A quote record as received from the rate engine, before
/// normalization. All fields are optional; unresolvable records are
/// excluded downstream instead of erroring.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawQuote {
    #[serde(default, alias = "vendorId", alias = "id_vendor")]
    pub vendor_id: Option<RawNumber>,
    #[serde(
        default,
        alias = "companyName",
        alias = "vendor_name",
        alias = "vendorName"
    )]
    pub company_name: Option<String>,

    // Price candidates, most to least authoritative.
    #[serde(default)]
    pub price: Option<RawNumber>,
    #[serde(default, alias = "freightCharge")]
    pub freight_charge: Option<RawNumber>,
    #[serde(default, alias = "totalAmount")]
    pub total_amount: Option<RawNumber>,
    #[serde(default)]
    pub rate: Option<RawNumber>,

    // ETA candidates.
    #[serde(default, alias = "estimatedDays", alias = "edd")]
    pub estimated_days: Option<RawNumber>,
    #[serde(default, alias = "transitDays")]
    pub transit_days: Option<RawNumber>,
    #[serde(default)]
    pub tat: Option<RawNumber>,

    #[serde(default)]
    pub rating: Option<RawNumber>,
    #[serde(default, alias = "actualWeight")]
    pub actual_weight: Option<f64>,
    #[serde(default, alias = "volumetricWeight")]
    pub volumetric_weight: Option<f64>,
    #[serde(default, alias = "isHidden")]
    pub is_hidden: bool,
    #[serde(default, alias = "approvalStatus")]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(default, alias = "isVerified")]
    pub is_verified: Option<bool>,
}

impl RawQuote {
    /// Convenience constructor for the common name + price shape.
    pub fn new(company_name: impl Into<String>, price: f64) -> Self {
        Self {
            company_name: Some(company_name.into()),
            price: Some(RawNumber::Number(price)),
            ..Self::default()
        }
    }

    pub fn with_days(mut self, days: f64) -> Self {
        self.estimated_days = Some(RawNumber::Number(days));
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(RawNumber::Number(rating));
        self
    }
}

/// User-adjustable ceilings re-applied on every recomputation.
/// All bounds are inclusive and unbounded by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub max_price: Option<f64>,
    pub max_days: Option<u32>,
    pub min_rating: Option<f64>,
}

impl FilterSettings {
    pub fn matches(&self, quote: &Quote) -> bool {
        if let Some(max) = self.max_price {
            if quote.price > max {
                return false;
            }
        }
        if let Some(max) = self.max_days {
            if quote.estimated_days > max {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            if quote.rating < min {
                return false;
            }
        }
        true
    }
}

/// Active sort criterion for both partitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortCriterion {
    #[default]
    Price,
    Time,
    Rating,
}

impl SortCriterion {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::Time => "Delivery time",
            Self::Rating => "Rating",
        }
    }
}

/// Transport mode for flat-rate FTL lookups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    #[default]
    Surface,
    Air,
}

/// Shipment parameters the synthetic-quote injector needs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShipmentProfile {
    pub mode: TransportMode,
    pub distance_km: f64,
    pub actual_weight: Option<f64>,
    pub volumetric_weight: Option<f64>,
}

/// Everything a single recomputation pass depends on, besides the
/// status-cache snapshot held by the engine.
#[derive(Clone, Debug, Default)]
pub struct CalcRequest {
    pub contracted: Vec<RawQuote>,
    pub available: Vec<RawQuote>,
    pub customer_id: Option<String>,
    pub filters: FilterSettings,
    pub sort: SortCriterion,
    pub shipment: ShipmentProfile,
}

/// The two ordered, annotated output lists. Contracted always
/// precedes Available in presentation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RankedQuotes {
    pub contracted: Vec<Quote>,
    pub available: Vec<Quote>,
}

impl RankedQuotes {
    /// Iterates both lists in presentation order.
    pub fn iter_all(&self) -> impl Iterator<Item = &Quote> {
        self.contracted.iter().chain(self.available.iter())
    }

    /// Both lists may legitimately be empty; callers render an
    /// explicit "no quotes" state for this.
    pub fn is_empty(&self) -> bool {
        self.contracted.is_empty() && self.available.is_empty()
    }
}
