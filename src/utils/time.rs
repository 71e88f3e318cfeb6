use std::time::{SystemTime, UNIX_EPOCH};

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_secs() as i64
}

/// Current year in UTC, derived from the Unix timestamp. Good enough for
/// the "year is not in the future" check; leap seconds do not matter here.
pub fn current_year() -> i32 {
    1970 + (current_timestamp() / 31_556_952) as i32
}
