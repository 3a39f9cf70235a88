//! Coerces raw rate-engine records into canonical quotes.
//!
//! The rate engine returns prices as numbers or as strings with
//! currency symbols and thousands separators, and transit times under
//! several field names. All of that is resolved here, once, at the
//! boundary; a record with no resolvable positive price is dropped
//! rather than reported as an error.

use uuid::Uuid;

use super::quote::{Partition, Quote, RawNumber, RawQuote, VerificationStatus};

/// Parses a raw numeric field leniently. Strings are stripped of
/// everything except digits and the decimal point before parsing.
pub fn lenient_number(raw: &RawNumber) -> Option<f64> {
    match raw {
        RawNumber::Number(value) => Some(*value).filter(|v| v.is_finite()),
        RawNumber::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
    }
}

/// First candidate yielding a finite, positive price wins.
pub fn resolve_price(raw: &RawQuote) -> Option<f64> {
    [&raw.price, &raw.freight_charge, &raw.total_amount, &raw.rate]
        .into_iter()
        .flatten()
        .filter_map(lenient_number)
        .find(|price| *price > 0.0)
}

/// First resolvable ETA candidate, defaulting to 0, then normalized to
/// whole days with `max(1, ceil(value))`.
pub fn resolve_eta(raw: &RawQuote) -> u32 {
    let value = [&raw.estimated_days, &raw.transit_days, &raw.tat]
        .into_iter()
        .flatten()
        .filter_map(lenient_number)
        .next()
        .unwrap_or(0.0);
    value.ceil().max(1.0) as u32
}

/// Rating clamped to [0, 5], 0 when absent or unparseable.
pub fn resolve_rating(raw: &RawQuote) -> f64 {
    raw.rating
        .as_ref()
        .and_then(lenient_number)
        .unwrap_or(0.0)
        .clamp(0.0, 5.0)
}

/// Lowercased, trimmed display name used for status lookups and as the
/// vendor-key fallback.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Stable identity: vendor record id when present, else the normalized
/// display name. Empty values yield `None`, which disables dedup for
/// that quote.
pub fn resolve_vendor_key(raw: &RawQuote) -> Option<String> {
    if let Some(id) = raw.vendor_id.as_ref() {
        let id = match id {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(t) => t.trim().to_string(),
        };
        if !id.is_empty() {
            return Some(id);
        }
    }
    raw.company_name
        .as_deref()
        .map(normalize_name)
        .filter(|name| !name.is_empty())
}

/// Builds a canonical quote from a raw record, or `None` when no
/// positive price resolves. Never errors.
pub fn normalize(raw: &RawQuote, partition: Partition) -> Option<Quote> {
    let price = resolve_price(raw)?;
    Some(Quote {
        id: Uuid::new_v4().to_string(),
        vendor_key: resolve_vendor_key(raw),
        company_name: raw
            .company_name
            .clone()
            .unwrap_or_else(|| "Unknown vendor".to_string()),
        price,
        estimated_days: resolve_eta(raw),
        rating: resolve_rating(raw),
        partition,
        is_special_vendor: false,
        is_hidden: raw.is_hidden,
        actual_weight: raw.actual_weight,
        volumetric_weight: raw.volumetric_weight,
        approval_status: raw.approval_status,
        is_verified: raw.is_verified,
        best_value: false,
        fastest: false,
        verification: VerificationStatus::Unknown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_string_is_scrubbed_before_parsing() {
        let raw = RawQuote {
            company_name: Some("A".to_string()),
            price: Some("₹1,234.50".into()),
            ..RawQuote::default()
        };
        assert_eq!(resolve_price(&raw), Some(1234.5));
    }

    #[test]
    fn price_candidates_are_tried_in_order() {
        let raw = RawQuote {
            price: Some("n/a".into()),
            freight_charge: Some(RawNumber::Number(0.0)),
            total_amount: Some(RawNumber::Number(980.0)),
            rate: Some(RawNumber::Number(5.0)),
            ..RawQuote::default()
        };
        // "n/a" scrubs to nothing, 0.0 is not positive, 980 wins.
        assert_eq!(resolve_price(&raw), Some(980.0));
    }

    #[test]
    fn unresolvable_price_drops_the_quote() {
        let raw = RawQuote {
            company_name: Some("A".to_string()),
            price: Some(RawNumber::Number(-10.0)),
            ..RawQuote::default()
        };
        assert_eq!(resolve_price(&raw), None);
        assert!(normalize(&raw, Partition::Available).is_none());
    }

    #[test]
    fn eta_is_ceiled_and_floored_to_one() {
        let raw = RawQuote::new("A", 100.0).with_days(2.3);
        assert_eq!(resolve_eta(&raw), 3);

        let raw = RawQuote::new("A", 100.0).with_days(0.0);
        assert_eq!(resolve_eta(&raw), 1);

        // No ETA field at all still yields a valid quote with 1 day.
        let raw = RawQuote::new("A", 100.0);
        assert_eq!(resolve_eta(&raw), 1);
    }

    #[test]
    fn rating_defaults_to_zero_and_is_clamped() {
        assert_eq!(resolve_rating(&RawQuote::new("A", 1.0)), 0.0);
        assert_eq!(resolve_rating(&RawQuote::new("A", 1.0).with_rating(7.2)), 5.0);
        assert_eq!(resolve_rating(&RawQuote::new("A", 1.0).with_rating(4.5)), 4.5);
    }

    #[test]
    fn vendor_key_prefers_record_id_over_name() {
        let raw = RawQuote {
            vendor_id: Some(RawNumber::Number(42.0)),
            company_name: Some("Acme Freight".to_string()),
            ..RawQuote::default()
        };
        assert_eq!(resolve_vendor_key(&raw), Some("42".to_string()));

        let raw = RawQuote::new("  Acme Freight ", 1.0);
        assert_eq!(resolve_vendor_key(&raw), Some("acme freight".to_string()));

        assert_eq!(resolve_vendor_key(&RawQuote::default()), None);
    }

    #[test]
    fn raw_quote_deserializes_mixed_field_shapes() {
        let raw: RawQuote = serde_json::from_str(
            r#"{
                "companyName": "Acme",
                "freightCharge": "2,500",
                "transitDays": 4,
                "isVerified": true,
                "approvalStatus": "approved"
            }"#,
        )
        .expect("tolerant deserialize");
        assert_eq!(resolve_price(&raw), Some(2500.0));
        assert_eq!(resolve_eta(&raw), 4);
        assert_eq!(raw.is_verified, Some(true));
    }
}
