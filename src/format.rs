// src/format.rs
//! Post text for a rider alert.

use crate::feed::Alert;

/// Feed wall-clock digits are passed through; this is only a label.
pub const TIMEZONE_LABEL: &str = "ET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCategory {
    Mover,
    Bus,
    Rail,
    Other,
}

impl AlertCategory {
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "MetroMover" | "Mover" => AlertCategory::Mover,
            "Bus" => AlertCategory::Bus,
            "Train" | "Rail" => AlertCategory::Rail,
            _ => AlertCategory::Other,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            AlertCategory::Mover => "\u{1F688}",        // 🚈
            AlertCategory::Bus => "\u{1F68C}",          // 🚌
            AlertCategory::Rail => "\u{1F686}",         // 🚆
            AlertCategory::Other => "\u{2139}\u{FE0F}", // ℹ️
        }
    }
}

/// `YYYYMMDDHHMMSS` -> `YYYY-MM-DD HH:MM:SS`. Short input yields empty segments.
pub fn format_stamp(stamp: &str) -> String {
    let seg = |a: usize, b: usize| stamp.get(a..b.min(stamp.len())).unwrap_or("");
    format!(
        "{}-{}-{} {}:{}:{}",
        seg(0, 4),
        seg(4, 6),
        seg(6, 8),
        seg(8, 10),
        seg(10, 12),
        seg(12, 14)
    )
}

pub fn format_post(alert: &Alert) -> String {
    let glyph = AlertCategory::from_type(&alert.kind).glyph();
    format!(
        "{} [{}] {} \n\nTime: {} {}",
        glyph,
        alert.kind,
        alert.message,
        format_stamp(&alert.message_stamp),
        TIMEZONE_LABEL
    )
}
