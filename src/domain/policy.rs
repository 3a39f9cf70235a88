//! Data-driven reclassification rules.
//!
//! Deployments differ in which carriers are demoted out of the
//! contracted list and which customers are pinned to an explicit
//! allow-list, so the rule table lives in configuration rather than in
//! code (see `util::persistence` for the on-disk form).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::normalize::normalize_name;
use super::quote::{Partition, Quote};
use super::special::{LOCAL_FTL_NAME, PARTNER_FTL_NAME};

/// Minimum shipment weight for full-truck-load eligibility, in kg.
pub const DEFAULT_FTL_WEIGHT_THRESHOLD_KG: f64 = 500.0;

/// Replaceable policy table evaluated exactly once per pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnginePolicy {
    /// Customer id -> company names allowed to stay Contracted. A
    /// customer present here has every non-matching quote forced to
    /// Available, regardless of what the upstream source said.
    #[serde(default)]
    pub customer_allowlists: HashMap<String, Vec<String>>,
    /// Carriers always moved out of Contracted; only the cheapest
    /// quote per demoted carrier survives the pass.
    #[serde(default)]
    pub demoted_carriers: Vec<String>,
    /// Names treated as client-injected special vendors.
    #[serde(default = "default_special_vendor_names")]
    pub special_vendor_names: Vec<String>,
    #[serde(default = "default_enabled")]
    pub local_ftl_enabled: bool,
    #[serde(default = "default_enabled")]
    pub partner_ftl_enabled: bool,
    #[serde(default = "default_ftl_weight_threshold")]
    pub ftl_weight_threshold_kg: f64,
}

fn default_special_vendor_names() -> Vec<String> {
    vec![LOCAL_FTL_NAME.to_string(), PARTNER_FTL_NAME.to_string()]
}

fn default_enabled() -> bool {
    true
}

fn default_ftl_weight_threshold() -> f64 {
    DEFAULT_FTL_WEIGHT_THRESHOLD_KG
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            customer_allowlists: HashMap::new(),
            demoted_carriers: Vec::new(),
            special_vendor_names: default_special_vendor_names(),
            local_ftl_enabled: true,
            partner_ftl_enabled: true,
            ftl_weight_threshold_kg: DEFAULT_FTL_WEIGHT_THRESHOLD_KG,
        }
    }
}

impl EnginePolicy {
    fn allowlist_for(&self, customer_id: Option<&str>) -> Option<Vec<String>> {
        let customer = customer_id?.trim();
        self.customer_allowlists
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(customer))
            .map(|(_, names)| names.iter().map(|n| normalize_name(n)).collect())
    }
}

/// Re-partitions the merged quote pool according to the policy table.
/// Partitions are not reconsidered again within the same pass.
///
/// Exception customers: only exact (case-insensitive) allow-list
/// matches stay Contracted. Everyone else: partitions are taken as
/// given, except that demoted carriers are forced to Available with
/// only their single cheapest quote kept. Special-vendor quotes are
/// exempt from demotion.
pub fn reclassify(policy: &EnginePolicy, customer_id: Option<&str>, quotes: &mut Vec<Quote>) {
    if let Some(allowed) = policy.allowlist_for(customer_id) {
        for quote in quotes.iter_mut() {
            let name = normalize_name(&quote.company_name);
            quote.partition = if allowed.contains(&name) {
                Partition::Contracted
            } else {
                Partition::Available
            };
        }
        return;
    }

    for carrier in &policy.demoted_carriers {
        let carrier = normalize_name(carrier);
        let cheapest = quotes
            .iter()
            .enumerate()
            .filter(|(_, q)| !q.is_special_vendor && normalize_name(&q.company_name) == carrier)
            .min_by(|(_, a), (_, b)| {
                a.price
                    .partial_cmp(&b.price)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| idx);

        let Some(keep) = cheapest else {
            continue;
        };
        quotes[keep].partition = Partition::Available;

        let mut idx = 0;
        quotes.retain(|q| {
            let drop = idx != keep
                && !q.is_special_vendor
                && normalize_name(&q.company_name) == carrier;
            idx += 1;
            !drop
        });
    }
}
