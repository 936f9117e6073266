//! Application-wide constants: adapter version, TTL policy, wire parameter
//! keys and persisted cookie keys.

/// Adapter version reported in the outbound `v` query parameter.
pub const ADAPTER_VERSION: &str = concat!("rs-", env!("CARGO_PKG_VERSION"));

/// Path segment identifying the bid request API revision.
pub const REQUEST_API_VERSION: &str = "v1";

/// Bid type for the first auction round in a browsing session.
pub const BID_TYPE_INIT: &str = "init";

/// Bid type for every subsequent auction round.
pub const BID_TYPE_REFRESH: &str = "refresh";

/// Long TTL for durable identity cookies (30 days).
pub const USER_ID_TTL_MS: u64 = 2_592_000_000;

/// Short TTL for session-scoped cookies (3 minutes).
pub const SESSION_TTL_MS: u64 = 180_000;

/// Bid validity reported to the orchestrator, derived from the session TTL.
pub const BID_TTL_SECONDS: u32 = (SESSION_TTL_MS / 1000) as u32;

/// The server quotes cpm in integer cents; divide by this to get the
/// decimal unit. Confirm with the upstream service before changing
/// deployments with a different currency precision.
pub const CPM_CENTS_PER_UNIT: f64 = 100.0;

// Query parameter keys. The terminator is a fixed empty-valued key
// signaling the end of the parameter list.
pub const PARAM_ADAPTER_VERSION: &str = "v";
pub const PARAM_USER_ID: &str = "vi";
pub const PARAM_SESSION_ID: &str = "si";
pub const PARAM_PAGEVIEW_ID: &str = "pvi";
pub const PARAM_PAGEVIEW_DEPTH: &str = "pvd";
pub const PARAM_LAST_PAGEVIEW_ID: &str = "lpvi";
pub const PARAM_LAST_PAGEVIEW_TIME: &str = "lpv";
pub const PARAM_BID_TYPE: &str = "bt";
pub const PARAM_SLOT_NAME: &str = "sn";
pub const PARAM_SLOT_SIZE: &str = "ssz";
pub const PARAM_LOCATION: &str = "lo";
pub const PARAM_REFERRER: &str = "r";
pub const PARAM_SCREEN_DIMENSIONS: &str = "sd";
pub const PARAM_TIMEZONE_OFFSET: &str = "to";
pub const PARAM_LANGUAGE: &str = "la";
pub const PARAM_NAVIGATOR_PLATFORM: &str = "np";
pub const PARAM_USER_AGENT: &str = "ua";
pub const PARAM_NAVIGATION_START: &str = "cts_ns";
pub const PARAM_ADAPTER_LOADED: &str = "cts_js";
pub const PARAM_BID_REQUEST_TIME: &str = "cts_ini";
pub const PARAM_TERMINATOR: &str = "e";

// Persisted state keys, all sharing the `__bt` first-party cookie prefix.
pub const COOKIE_USER_ID: &str = "__btu";
pub const COOKIE_SESSION_ID: &str = "__bts";
pub const COOKIE_PAGEVIEW_DEPTH: &str = "__btd";
pub const COOKIE_LAST_PAGEVIEW_ID: &str = "__btl";
pub const COOKIE_LAST_PAGEVIEW_TIME: &str = "__btv";
pub const COOKIE_SESSION_BLOCKED: &str = "__btn";
pub const COOKIE_URL_PREFIX: &str = "__btc";
