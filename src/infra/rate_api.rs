//! Thin asynchronous client for the freight-rate platform API.
//!
//! - Typed accessors for vendor-status payloads and FTL flat rates.
//! - Flat rates sit behind a 60-minute in-memory cache with a stale
//!   fallback; status payloads are always fetched fresh, the 30-second
//!   poller owns their cadence.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::quote::{ApprovalStatus, TransportMode};
use crate::domain::special::{FlatRateSlab, FlatRateTable, FtlVendor};
use crate::domain::status::VendorStatusUpdate;

const DEFAULT_BASE_URL: &str = "https://api.freightdesk.in/v1/";
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const USER_AGENT: &str = "freight-rate-engine/1.0.0";

#[derive(Debug, Error)]
pub enum RateApiError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Default)]
struct RateCache {
    flat_rates: Option<Cached<FlatRateTable>>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: String,
    #[serde(default)]
    #[allow(dead_code)]
    http_code: Option<u16>,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct RateApiClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<RateCache>>,
    ttl: Duration,
}

impl RateApiClient {
    pub fn new() -> Result<Self, RateApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, RateApiError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(RateCache::default())),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Latest approval/verification state for every vendor the
    /// platform knows about. Never cached; callers poll this.
    pub async fn get_vendor_statuses(&self) -> Result<Vec<VendorStatusUpdate>, RateApiError> {
        let url = self.url("vendor_statuses")?;
        let entries: Vec<VendorStatusDto> = self.fetch_data(self.http.get(url)).await?;
        debug!(count = entries.len(), "fetched vendor statuses");
        Ok(entries.into_iter().map(VendorStatusUpdate::from).collect())
    }

    /// FTL flat-rate table, cached for an hour with a stale fallback
    /// when the platform is unreachable.
    pub async fn get_flat_rates(&self) -> Result<CachedPayload<FlatRateTable>, RateApiError> {
        if let Some(payload) = self.cached_flat_rates().await {
            return Ok(payload);
        }

        let url = self.url("ftl_rates")?;
        match self.fetch_data::<Vec<FlatRateDto>>(self.http.get(url)).await {
            Ok(rows) => {
                let slabs: Vec<FlatRateSlab> =
                    rows.into_iter().filter_map(FlatRateDto::into_slab).collect();
                debug!(count = slabs.len(), "fetched flat-rate slabs");
                let table = FlatRateTable::new(slabs);
                Ok(self.store_flat_rates(table).await)
            }
            Err(error) => {
                if let Some(stale) = self.stale_flat_rates().await {
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.flat_rates = None;
    }

    async fn cached_flat_rates(&self) -> Option<CachedPayload<FlatRateTable>> {
        let cache = self.cache.lock().await;
        cache
            .flat_rates
            .as_ref()
            .and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn stale_flat_rates(&self) -> Option<CachedPayload<FlatRateTable>> {
        let cache = self.cache.lock().await;
        cache.flat_rates.as_ref().map(Cached::stale)
    }

    async fn store_flat_rates(&self, table: FlatRateTable) -> CachedPayload<FlatRateTable> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(table.clone(), fetched_at, CacheStatus::Fresh);
        self.cache.lock().await.flat_rates = Some(Cached::new(table, fetched_at));
        payload
    }

    async fn fetch_data<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, RateApiError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?.error_for_status()?;
        let envelope: ApiEnvelope<T> = response.json().await?;
        let ApiEnvelope {
            status,
            data,
            message,
            ..
        } = envelope;

        if status.eq_ignore_ascii_case("ok") {
            data.ok_or_else(|| RateApiError::Api("response missing data".into()))
        } else {
            Err(RateApiError::Api(message.unwrap_or(status)))
        }
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

#[derive(Debug, Deserialize)]
struct VendorStatusDto {
    #[serde(alias = "companyName", alias = "vendor_name")]
    company_name: String,
    #[serde(default, alias = "approvalStatus")]
    approval_status: Option<String>,
    #[serde(default, alias = "isVerified")]
    is_verified: Option<i32>,
    #[serde(default, alias = "date_modified", alias = "dateModified")]
    date_modified: Option<i64>,
    #[serde(default, alias = "updatedAt")]
    updated_at: Option<String>,
}

impl From<VendorStatusDto> for VendorStatusUpdate {
    fn from(dto: VendorStatusDto) -> Self {
        Self {
            company_name: dto.company_name,
            approval: parse_approval(dto.approval_status.as_deref()),
            is_verified: dto.is_verified.unwrap_or(0) == 1,
            updated_at: parse_timestamp_fields(dto.date_modified, dto.updated_at),
        }
    }
}

fn parse_approval(raw: Option<&str>) -> ApprovalStatus {
    match raw.map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("approved") => ApprovalStatus::Approved,
        Some(value) if value.eq_ignore_ascii_case("rejected") => ApprovalStatus::Rejected,
        _ => ApprovalStatus::Pending,
    }
}

#[derive(Debug, Deserialize)]
struct FlatRateDto {
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default, alias = "transportMode")]
    mode: Option<String>,
    #[serde(default, alias = "maxDistanceKm")]
    max_distance_km: Option<f64>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default, alias = "transitDays")]
    transit_days: Option<u32>,
}

impl FlatRateDto {
    /// Malformed rows are skipped, never fatal.
    fn into_slab(self) -> Option<FlatRateSlab> {
        let vendor = match self.vendor.as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("local") => FtlVendor::Local,
            Some(value) if value.eq_ignore_ascii_case("partner") => FtlVendor::Partner,
            _ => return None,
        };
        let mode = match self.mode.as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("air") => TransportMode::Air,
            Some(_) => TransportMode::Surface,
            None => TransportMode::Surface,
        };
        let max_distance_km = self.max_distance_km.filter(|d| d.is_finite() && *d > 0.0)?;
        let price = self.price.filter(|p| p.is_finite() && *p > 0.0)?;
        Some(FlatRateSlab {
            vendor,
            mode,
            max_distance_km,
            price,
            transit_days: self.transit_days,
        })
    }
}

fn parse_timestamp_str(raw: Option<&str>) -> Option<SystemTime> {
    raw.and_then(|value| {
        OffsetDateTime::parse(value, &Rfc3339).ok().and_then(|dt| {
            if dt.unix_timestamp() >= 0 {
                let secs = dt.unix_timestamp() as u64;
                let nanos = dt.nanosecond() as u64;
                SystemTime::UNIX_EPOCH
                    .checked_add(Duration::from_secs(secs))
                    .and_then(|stamp| stamp.checked_add(Duration::from_nanos(nanos)))
            } else {
                None
            }
        })
    })
}

fn parse_timestamp_fields(epoch: Option<i64>, iso: Option<String>) -> Option<SystemTime> {
    if let Some(secs) = epoch {
        if secs >= 0 {
            return Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs as u64));
        }
    }
    parse_timestamp_str(iso.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_strings_parse_case_insensitively() {
        assert_eq!(parse_approval(Some("Approved")), ApprovalStatus::Approved);
        assert_eq!(parse_approval(Some(" rejected ")), ApprovalStatus::Rejected);
        assert_eq!(parse_approval(Some("whatever")), ApprovalStatus::Pending);
        assert_eq!(parse_approval(None), ApprovalStatus::Pending);
    }

    #[test]
    fn malformed_flat_rate_rows_are_skipped() {
        let row = FlatRateDto {
            vendor: Some("local".to_string()),
            mode: None,
            max_distance_km: Some(500.0),
            price: Some(0.0),
            transit_days: None,
        };
        assert!(row.into_slab().is_none());

        let row = FlatRateDto {
            vendor: None,
            mode: Some("surface".to_string()),
            max_distance_km: Some(500.0),
            price: Some(7200.0),
            transit_days: Some(3),
        };
        assert!(row.into_slab().is_none());
    }

    #[test]
    fn timestamp_fields_prefer_epoch_over_iso() {
        let stamp = parse_timestamp_fields(Some(1_700_000_000), Some("junk".to_string()))
            .expect("epoch parses");
        assert_eq!(
            stamp,
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
        );
        assert!(parse_timestamp_fields(None, Some("junk".to_string())).is_none());
        assert!(
            parse_timestamp_fields(None, Some("2026-08-30T10:00:00Z".to_string())).is_some()
        );
    }
}
