// src/feed/mod.rs
pub mod rider_alerts;
pub mod types;

pub use rider_alerts::RiderAlertsFeed;
pub use types::{Alert, AlertFeed, FetchedAlerts};

use once_cell::sync::OnceCell;
use regex::Regex;

/// Clean an alert body: decode double-escaped entities, drop inline formatting
/// tags, collapse whitespace. Literal `<` / `>` in the text are kept.
pub fn normalize_message(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);

    // Closed list only; "<10 min ... >20 min" is message text, not markup.
    static RE_FORMAT_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_FORMAT_TAGS.get_or_init(|| {
        Regex::new(r"(?i)</?(?:br|p|b|i|u|em|strong|span|div|font)(?:\s[^<>]*)?/?>").unwrap()
    });
    let untagged = re_tags.replace_all(&decoded, " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&untagged, " ").trim().to_string()
}
