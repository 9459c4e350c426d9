//! Shared constants for timberdesk.
//!
//! Centralizes the backend limits and client defaults used across crates.

/// Hard server-side ceiling on `limit` for collection endpoints.
pub const MAX_PAGE_SIZE: u64 = 20;

/// Page size used by the progressive loader and the stats aggregator.
pub const DEFAULT_PAGE_SIZE: u64 = MAX_PAGE_SIZE;

/// Lifetime of a cached GET response in seconds (5 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Pause between page fetches of a progressive walk, for progress pacing only.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 50;

/// Backend base URL when `TIMBERDESK_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Path prefix of every REST collection.
pub const API_PREFIX: &str = "/api/v1";
