// Utility functions
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::path::Path;

/// Extensions the uploader accepts, lower-case.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

/// Parses an RFC 3339 timestamp, or a naive ISO-8601 one taken as local time.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    let s = date_str.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Lower-cased extension of `path`, if it has one.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn is_accepted_image(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Mime type for an accepted image path.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    match extension(path)?.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
