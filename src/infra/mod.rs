//! Async collaborators around the engine: the platform API client and
//! the background status poller.

pub mod rate_api;
pub mod status_poll;

pub use rate_api::{CacheStatus, CachedPayload, RateApiClient, RateApiError};
pub use status_poll::{StatusPoller, STATUS_POLL_PERIOD};
