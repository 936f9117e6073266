//! Delimited slot name/size string codec.
//!
//! A list of slot groupings encodes to two parallel strings: slot names
//! joined by `|`, and per-slot size lists with `.` between sizes and `|`
//! between slots, e.g. `leaderboard|medrec` / `728x90|300x600.300x250`.

use crate::sizes::Size;

/// One slot grouping: a slot name with its de-duplicated candidate sizes
/// in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub slot_name: String,
    pub sizes: Vec<(u32, u32)>,
}

/// The two parallel delimited strings sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotStrings {
    pub names: String,
    pub sizes: String,
}

/// Encode slot groupings in input order. A slot with no sizes is dropped
/// from both strings; empty input encodes to empty strings.
pub fn encode(slots: &[SlotRequest]) -> SlotStrings {
    let mut names = Vec::new();
    let mut sizes = Vec::new();
    for slot in slots {
        if slot.sizes.is_empty() {
            continue;
        }
        names.push(slot.slot_name.as_str());
        sizes.push(
            slot.sizes
                .iter()
                .map(|(w, h)| format!("{}x{}", w, h))
                .collect::<Vec<_>>()
                .join("."),
        );
    }
    SlotStrings {
        names: names.join("|"),
        sizes: sizes.join("|"),
    }
}

/// Logical inverse of [`encode`], used for validation. Sizes that do not
/// parse are dropped; a slot left without sizes is dropped entirely, so
/// `decode(encode(x)) == x` holds for well-formed input only.
pub fn decode(names: &str, sizes: &str) -> Vec<SlotRequest> {
    if names.is_empty() {
        return Vec::new();
    }
    names
        .split('|')
        .zip(sizes.split('|'))
        .filter_map(|(slot_name, size_list)| {
            let sizes: Vec<(u32, u32)> = size_list
                .split('.')
                .filter_map(|text| Size::parse_text(text).as_pair())
                .collect();
            if sizes.is_empty() {
                None
            } else {
                Some(SlotRequest {
                    slot_name: slot_name.to_string(),
                    sizes,
                })
            }
        })
        .collect()
}
