//! Orchestrator-facing data models: inbound bid requests, the outbound
//! request descriptor, the server response body and normalized bids.

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::correlation::SlotRequestParams;
use crate::error::AdapterError;
use crate::sizes::RawSizes;

/// Bidder-specific parameters carried on each bid request.
#[derive(Debug, Clone, Deserialize)]
pub struct BidderParams {
    /// Publisher site number.
    #[serde(default)]
    pub psn: String,
    /// Slot name to request a bid for.
    #[serde(default)]
    pub slot: String,
}

/// One bid request entry from the auction orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct BidRequest {
    pub params: BidderParams,
    pub sizes: RawSizes,
    #[serde(rename = "bidId")]
    pub bid_id: String,
}

impl BidRequest {
    /// A bid request is valid when it names both a publisher and a slot.
    pub fn is_valid(&self) -> bool {
        !self.params.psn.is_empty() && !self.params.slot.is_empty()
    }
}

/// Read-only page/device/locale passthrough captured by the host page.
#[derive(Debug, Clone)]
pub struct PageEnvironment {
    pub location: String,
    pub referrer: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub timezone_offset_minutes: i32,
    pub language: String,
    pub platform: String,
    pub user_agent: String,
    /// Performance timing navigation start, milliseconds since epoch.
    pub navigation_start_ms: i64,
}

/// Outbound request descriptor for one auction round. Carries the ordered
/// query parameter list and the slot params the response interpreter needs
/// later to correlate server bids.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    pub method: &'static str,
    pub url: String,
    pub data: Vec<(&'static str, String)>,
    pub slot_params: SlotRequestParams,
}

impl ServerRequest {
    /// Look up a query parameter by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render the query string. Empty-valued keys (the terminator) are
    /// emitted bare.
    pub fn query_string(&self) -> String {
        self.data
            .iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    (*key).to_string()
                } else {
                    format!("{}={}", key, urlencoding::encode(value))
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full request URL including the query string.
    pub fn full_url(&self) -> String {
        format!("{}?{}", self.url, self.query_string())
    }
}

/// Cpm as the server sends it: an integer-cents quantity, quoted or not.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CpmValue {
    Text(String),
    Number(f64),
}

impl CpmValue {
    /// The cents quantity, or `None` when unparsable.
    pub fn cents(&self) -> Option<f64> {
        match self {
            CpmValue::Text(text) => text.trim().parse::<f64>().ok(),
            CpmValue::Number(number) => Some(*number),
        }
    }
}

/// One per-slot bid entry in the server response. All fields are optional
/// on the wire; entries missing any of them are skipped, not fatal.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotBid {
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub cpm: Option<CpmValue>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Server response body for one auction round.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerResponseBody {
    /// Pageview id echo.
    #[serde(default)]
    pub pvi: Option<String>,
    /// Updated edge-server URL prefix for subsequent rounds.
    #[serde(default)]
    pub url_prefix: Option<String>,
    /// User sync pixel URLs to drop after the auction.
    #[serde(default)]
    pub user_syncs: Vec<String>,
    #[serde(default)]
    pub slots: Option<Vec<SlotBid>>,
}

impl ServerResponseBody {
    /// Decode a response body from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for this shape.
    pub fn from_json(body: &str) -> Result<Self, Report<AdapterError>> {
        serde_json::from_str(body).map_err(|e| {
            Report::new(AdapterError::ResponseDecode {
                message: e.to_string(),
            })
        })
    }

    /// User sync pixels declared by the server.
    pub fn user_syncs(&self) -> &[String] {
        &self.user_syncs
    }
}

/// A bid normalized for the orchestrator's bid-collection step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedBid {
    pub bid_id: String,
    /// Decimal currency units (server cents scaled down).
    pub cpm: f64,
    pub width: u32,
    pub height: u32,
    pub creative_id: String,
    pub currency: String,
    pub net_revenue: bool,
    /// Seconds this bid stays usable.
    pub ttl: u32,
    /// Creative markup referencing the creative id.
    pub ad: String,
}
