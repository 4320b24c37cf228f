//! Bridge-level constants
//!
//! Centralized location for the TTLs, thresholds and page sizes the bridge
//! components agree on.

// Session caching. EXT tokens live ~15 minutes; the cache TTL is strictly
// shorter so a cached token is never presented after real expiry.
pub const EXT_TOKEN_LIFETIME_SECS: u64 = 900;
pub const SESSION_CACHE_TTL_SECS: u64 = 840;
pub const SESSION_CACHE_KEY: &str = "steward:ext:session";

// Circuit breaker. The counter's presence at or above the threshold *is*
// the open state; the TTL is the cool-down window.
pub const CIRCUIT_KEY: &str = "steward:ext:failures";
pub const CIRCUIT_FAILURE_THRESHOLD: i64 = 3;
pub const CIRCUIT_COOLDOWN_SECS: u64 = 300;

// Pagination
pub const DEFAULT_SYNC_PAGE_SIZE: u32 = 100;
pub const PORTAL_PAGE_SIZE: u32 = 50;

// Dry-run syncs map at most this many records for the preview
pub const DRY_RUN_PREVIEW_CAP: usize = 5;

// Attachment URLs issued by EXT stay valid for roughly this long
pub const ATTACHMENT_URL_VALIDITY_SECS: u64 = 900;
