//! Per-auction-round correlation between server slot bids and the
//! orchestrator's internal bid identifiers.
//!
//! The correlation key is `{pageviewId}:{slotName}:{WxH}`, unique within
//! one auction round. The map is rebuilt fresh per round and never shared
//! across rounds.

use std::collections::HashMap;

use crate::codec::{encode, SlotRequest};
use crate::models::BidRequest;
use crate::sizes::normalize;

/// Slot-derived request parameters plus the correlation map for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotRequestParams {
    /// Publisher id, taken from the first bid request that declares one.
    pub psn: Option<String>,
    /// `|`-joined slot names in first-seen order.
    pub names: String,
    /// Per-slot `WxH` sizes, `.`-joined within a slot, `|`-joined between.
    pub sizes: String,
    /// Correlation key to internal bid id.
    pub bid_id_map: HashMap<String, String>,
}

/// Compose the correlation key for one (pageview, slot, size) combination.
pub fn correlation_key(pageview_id: &str, slot_name: &str, size: &str) -> String {
    format!("{}:{}:{}", pageview_id, slot_name, size)
}

/// Build the slot strings and correlation map for one auction round.
///
/// Slot groupings keep first-seen order across the whole bid list, with a
/// separate lookup index so ordering is explicit rather than a map
/// iteration accident. Duplicate sizes for a slot are suppressed
/// (first-seen wins for ordering; last writer wins for the map, though
/// de-duplication means duplicates should not occur). A bid whose size
/// cannot be reduced to a numeric pair is excluded from the slot strings
/// and the map atomically.
pub fn build(pageview_id: &str, bid_requests: &[BidRequest]) -> SlotRequestParams {
    if pageview_id.is_empty() || bid_requests.is_empty() {
        return SlotRequestParams::default();
    }

    let mut slots: Vec<SlotRequest> = Vec::new();
    let mut slot_index: HashMap<String, usize> = HashMap::new();
    let mut bid_id_map = HashMap::new();
    let mut psn = None;

    for bid in bid_requests {
        if psn.is_none() && !bid.params.psn.is_empty() {
            psn = Some(bid.params.psn.clone());
        }
        let slot_name = bid.params.slot.as_str();
        if slot_name.is_empty() {
            log::debug!("skipping bid without slot name: bid_id={}", bid.bid_id);
            continue;
        }
        for size in normalize(&bid.sizes) {
            let Some((width, height)) = size.as_pair() else {
                continue;
            };
            let idx = *slot_index.entry(slot_name.to_string()).or_insert_with(|| {
                slots.push(SlotRequest {
                    slot_name: slot_name.to_string(),
                    sizes: Vec::new(),
                });
                slots.len() - 1
            });
            let size_text = format!("{}x{}", width, height);
            bid_id_map.insert(
                correlation_key(pageview_id, slot_name, &size_text),
                bid.bid_id.clone(),
            );
            if !slots[idx].sizes.contains(&(width, height)) {
                slots[idx].sizes.push((width, height));
            }
        }
    }

    let strings = encode(&slots);
    SlotRequestParams {
        psn,
        names: strings.names,
        sizes: strings.sizes,
        bid_id_map,
    }
}

/// Exact-key lookup of the internal bid id for a server slot/size entry.
/// Absent means the server referenced a combination the client never
/// requested; such entries must be dropped, not defaulted.
pub fn resolve<'a>(
    bid_id_map: &'a HashMap<String, String>,
    pageview_id: &str,
    slot_name: &str,
    size: &str,
) -> Option<&'a str> {
    bid_id_map
        .get(&correlation_key(pageview_id, slot_name, size))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tests::{
        bid_leaderboard_728x90, bid_medrec_300x250, bid_medrec_300x600, bid_request,
    };

    #[test]
    fn test_empty_inputs_yield_well_formed_empty_result() {
        let empty = SlotRequestParams::default();
        assert_eq!(build("", &[bid_medrec_300x250()]), empty);
        assert_eq!(build("f0e1d2c", &[]), empty);
        assert_eq!(empty.names, "");
        assert_eq!(empty.sizes, "");
        assert!(empty.bid_id_map.is_empty());
    }

    #[test]
    fn test_build_groups_slots_and_maps_bid_ids() {
        let bids = [
            bid_leaderboard_728x90(),
            bid_medrec_300x600(),
            bid_medrec_300x250(),
        ];
        let params = build("f0e1d2c", &bids);

        assert_eq!(params.psn.as_deref(), Some("1234"));
        assert_eq!(params.names, "leaderboard|medrec");
        assert_eq!(params.sizes, "728x90|300x600.300x250");

        assert_eq!(
            params.bid_id_map.get("f0e1d2c:leaderboard:728x90"),
            Some(&"2240b2af6064bb".to_string())
        );
        assert_eq!(
            params.bid_id_map.get("f0e1d2c:medrec:300x600"),
            Some(&"332067957eaa33".to_string())
        );
        assert_eq!(
            params.bid_id_map.get("f0e1d2c:medrec:300x250"),
            Some(&"49d7fe5c3a15ed".to_string())
        );
    }

    #[test]
    fn test_build_keeps_bid_request_order() {
        let bids = [
            bid_medrec_300x600(),
            bid_leaderboard_728x90(),
            bid_medrec_300x250(),
        ];
        let params = build("f0e1d2c", &bids);

        assert_eq!(params.names, "medrec|leaderboard");
        assert_eq!(params.sizes, "300x600.300x250|728x90");
    }

    #[test]
    fn test_malformed_size_excluded_from_strings_and_map() {
        let malformed = bid_request("1234", "medrec", serde_json::json!(["300by250"]), "deadbeef");
        let params = build("affffffe", &[malformed, bid_leaderboard_728x90()]);

        assert_eq!(params.names, "leaderboard");
        assert_eq!(params.sizes, "728x90");
        assert_eq!(params.bid_id_map.len(), 1);
        assert!(!params
            .bid_id_map
            .keys()
            .any(|key| key.contains(":medrec:")));
    }

    #[test]
    fn test_duplicate_sizes_suppressed() {
        let bids = [bid_medrec_300x250(), bid_medrec_300x250()];
        let params = build("f0e1d2c", &bids);
        assert_eq!(params.names, "medrec");
        assert_eq!(params.sizes, "300x250");
        assert_eq!(params.bid_id_map.len(), 1);
    }

    #[test]
    fn test_non_adjacent_slot_entries_merge() {
        let bids = [
            bid_medrec_300x600(),
            bid_leaderboard_728x90(),
            bid_medrec_300x250(),
        ];
        let params = build("f0e1d2c", &bids);
        assert_eq!(params.names.matches("medrec").count(), 1);
    }

    #[test]
    fn test_first_seen_publisher_id_wins() {
        let bids = [
            bid_request("1111", "medrec", serde_json::json!([300, 250]), "aa"),
            bid_request("2222", "leaderboard", serde_json::json!([728, 90]), "bb"),
        ];
        let params = build("f0e1d2c", &bids);
        assert_eq!(params.psn.as_deref(), Some("1111"));
    }

    #[test]
    fn test_resolve_exact_match_only() {
        let params = build("f0e1d2c", &[bid_medrec_300x250()]);

        assert_eq!(
            resolve(&params.bid_id_map, "f0e1d2c", "medrec", "300x250"),
            Some("49d7fe5c3a15ed")
        );
        assert_eq!(
            resolve(&params.bid_id_map, "f0e1d2c", "medrec", "300x251"),
            None
        );
        assert_eq!(
            resolve(&params.bid_id_map, "f0e1d2c", "medrec ", "300x250"),
            None
        );
        assert_eq!(
            resolve(&params.bid_id_map, "other", "medrec", "300x250"),
            None
        );
    }
}
