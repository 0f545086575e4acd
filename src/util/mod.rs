use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub mod persistence;

/// Fresh key for an item instance placed on a trade side.
pub fn new_instance_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Accepts unix seconds or an RFC 3339 timestamp.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(seconds) = raw.parse::<i64>() {
        return Some(seconds);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .map(|dt| dt.unix_timestamp())
}
