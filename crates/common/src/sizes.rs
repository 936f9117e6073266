//! Tagged size variants decided once at the input boundary.
//!
//! The orchestrator sends slot sizes in several wire shapes: a single flat
//! `[w, h]` pair, a list of pairs, or `"WxH"` strings. Everything is
//! reduced to [`Size`] here so the rest of the pipeline never probes raw
//! input again. An entry that cannot be reduced to a numeric pair is
//! tagged [`Size::Malformed`] and excluded downstream.

use serde::Deserialize;
use serde_json::Value;

/// The `sizes` field as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSizes {
    /// Single flat pair: `[728, 90]`.
    Pair([u32; 2]),
    /// List of entries: `[[300, 250], "300x600"]`.
    Many(Vec<RawSize>),
    /// Anything else; probed no further.
    Other(Value),
}

/// One entry inside a size list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSize {
    Pair([u32; 2]),
    Text(String),
    Other(Value),
}

/// A size after the input-boundary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Pair { width: u32, height: u32 },
    Malformed,
}

impl Size {
    pub fn from_raw(raw: &RawSize) -> Self {
        match raw {
            RawSize::Pair([width, height]) => Size::Pair {
                width: *width,
                height: *height,
            },
            RawSize::Text(text) => Size::parse_text(text),
            RawSize::Other(_) => Size::Malformed,
        }
    }

    /// Parse a `"WxH"` string into a pair; anything else is malformed.
    pub fn parse_text(text: &str) -> Self {
        match text.split_once('x') {
            Some((width, height)) => match (width.parse::<u32>(), height.parse::<u32>()) {
                (Ok(width), Ok(height)) => Size::Pair { width, height },
                _ => Size::Malformed,
            },
            None => Size::Malformed,
        }
    }

    pub fn as_pair(&self) -> Option<(u32, u32)> {
        match self {
            Size::Pair { width, height } => Some((*width, *height)),
            Size::Malformed => None,
        }
    }
}

/// Reduce the wire-shape `sizes` field to tagged sizes, preserving input
/// order. Malformed entries are kept (tagged) so callers can count and
/// exclude them explicitly.
pub fn normalize(raw: &RawSizes) -> Vec<Size> {
    match raw {
        RawSizes::Pair([width, height]) => vec![Size::Pair {
            width: *width,
            height: *height,
        }],
        RawSizes::Many(entries) => entries.iter().map(Size::from_raw).collect(),
        RawSizes::Other(_) => vec![Size::Malformed],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawSizes {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_flat_pair() {
        let sizes = normalize(&raw(json!([728, 90])));
        assert_eq!(
            sizes,
            vec![Size::Pair {
                width: 728,
                height: 90
            }]
        );
    }

    #[test]
    fn test_list_of_pairs() {
        let sizes = normalize(&raw(json!([[300, 250], [300, 600]])));
        assert_eq!(
            sizes,
            vec![
                Size::Pair {
                    width: 300,
                    height: 250
                },
                Size::Pair {
                    width: 300,
                    height: 600
                },
            ]
        );
    }

    #[test]
    fn test_text_sizes() {
        let sizes = normalize(&raw(json!(["300x250", "fluid"])));
        assert_eq!(
            sizes,
            vec![
                Size::Pair {
                    width: 300,
                    height: 250
                },
                Size::Malformed,
            ]
        );
    }

    #[test]
    fn test_parse_text_rejects_junk() {
        assert_eq!(Size::parse_text("300x"), Size::Malformed);
        assert_eq!(Size::parse_text("x250"), Size::Malformed);
        assert_eq!(Size::parse_text("300 x 250"), Size::Malformed);
        assert_eq!(Size::parse_text("-300x250"), Size::Malformed);
        assert_eq!(Size::parse_text(""), Size::Malformed);
    }

    #[test]
    fn test_unrecognized_shape_is_malformed() {
        let sizes = normalize(&raw(json!({"w": 300, "h": 250})));
        assert_eq!(sizes, vec![Size::Malformed]);
    }
}
