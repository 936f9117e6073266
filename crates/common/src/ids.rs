//! Collision-resistant, time-sortable string identifiers.
//!
//! Format: base-36 lowercase milliseconds since the UNIX epoch, followed by
//! a fixed-length random base-36 suffix, e.g. `jbgxsyrlx9fxnr1hbl`. The
//! time component makes identifiers lexicographically non-decreasing over
//! time; the suffix disambiguates identifiers minted within the same
//! millisecond.

use chrono::Utc;
use rand::Rng;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix appended to the time component.
pub const ID_SUFFIX_LENGTH: usize = 10;

/// Generate a new identifier. Always succeeds.
pub fn new_id() -> String {
    new_id_at(Utc::now().timestamp_millis())
}

fn new_id_at(epoch_ms: i64) -> String {
    let mut id = to_base36(epoch_ms.max(0) as u64);
    let mut rng = rand::thread_rng();
    for _ in 0..ID_SUFFIX_LENGTH {
        id.push(BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char);
    }
    id
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}
