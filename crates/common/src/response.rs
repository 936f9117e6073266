//! Server response interpretation: per-slot bid normalization.

use url::Url;

use crate::adapter::AdapterContext;
use crate::constants::{BID_TTL_SECONDS, CPM_CENTS_PER_UNIT, PARAM_PAGEVIEW_ID};
use crate::correlation;
use crate::ids;
use crate::models::{NormalizedBid, ServerRequest, ServerResponseBody};
use crate::sizes::Size;
use crate::store::StateStore;

impl<S: StateStore> AdapterContext<S> {
    /// Unpack a server response into normalized bids for the orchestrator.
    ///
    /// Returns an empty list when opted out or when the body is absent or
    /// carries no slot-bid list. A server-declared URL prefix update is
    /// persisted before any bid is processed. Individual slot entries are
    /// dropped silently when a required field (`cpm`, `size`, `slot`) is
    /// missing or when the slot/size combination was never requested.
    pub fn interpret_response(
        &mut self,
        body: Option<&ServerResponseBody>,
        request: &ServerRequest,
    ) -> Vec<NormalizedBid> {
        if self.is_opt_out() {
            return Vec::new();
        }
        let Some(body) = body else {
            return Vec::new();
        };

        if let Some(prefix) = body.url_prefix.as_deref() {
            if is_valid_url_prefix(prefix) {
                self.set_url_prefix(prefix);
            } else {
                log::warn!("ignoring malformed url_prefix from server: {}", prefix);
            }
        }

        let Some(slot_bids) = body.slots.as_deref() else {
            return Vec::new();
        };
        let pageview_id = request.param(PARAM_PAGEVIEW_ID).unwrap_or_default();

        let mut bids = Vec::new();
        for slot_bid in slot_bids {
            let (Some(slot), Some(size), Some(cpm)) =
                (&slot_bid.slot, &slot_bid.size, &slot_bid.cpm)
            else {
                log::debug!("dropping slot bid with missing fields: {:?}", slot_bid);
                continue;
            };
            let Some(cents) = cpm.cents() else {
                log::debug!("dropping slot bid with unparsable cpm: {:?}", slot_bid);
                continue;
            };
            let Some(bid_id) =
                correlation::resolve(&request.slot_params.bid_id_map, pageview_id, slot, size)
            else {
                log::debug!(
                    "dropping unrequested slot/size from server: {}:{}",
                    slot,
                    size
                );
                continue;
            };

            // Display geometry only; the correlation above used the raw
            // size string.
            let (width, height) = Size::parse_text(size).as_pair().unwrap_or((1, 1));
            let creative_id = ids::new_id();
            bids.push(NormalizedBid {
                bid_id: bid_id.to_string(),
                cpm: cents / CPM_CENTS_PER_UNIT,
                width,
                height,
                ad: build_creative(slot, size, &creative_id),
                creative_id,
                currency: self.settings().bidder.currency.clone(),
                net_revenue: true,
                ttl: BID_TTL_SECONDS,
            });
        }
        bids
    }
}

/// Creative tag rendered into the winning slot; the render queue resolves
/// the slot/size to markup and reports into the container by creative id.
fn build_creative(slot: &str, size: &str, creative_id: &str) -> String {
    format!(
        concat!(
            "<div id=\"bt-{id}\"></div>",
            "<script type=\"text/javascript\">var btq = btq || [];",
            "btq.push(function () {{ bidtrace.renderAd('{slot}:{size}', 'bt-{id}'); }});",
            "</script>"
        ),
        id = creative_id,
        slot = slot,
        size = size,
    )
}

/// A usable prefix is an absolute or protocol-relative http(s) URL.
fn is_valid_url_prefix(prefix: &str) -> bool {
    let absolute = if let Some(rest) = prefix.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        prefix.to_string()
    };
    match Url::parse(&absolute) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
