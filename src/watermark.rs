// src/watermark.rs
//! Novelty checks against the stored watermark.
//!
//! Feed stamps are fixed-width `YYYYMMDDHHMMSS` digit strings, so plain string
//! ordering is the same as numeric ordering.

/// Stand-in for a missing watermark; sorts below every real stamp.
pub const SENTINEL: &str = "0";

/// Watermark value used for comparisons (`None` / empty -> `"0"`).
pub fn effective(watermark: Option<&str>) -> &str {
    match watermark {
        Some(w) if !w.is_empty() => w,
        _ => SENTINEL,
    }
}

/// True iff `stamp` is strictly newer than the watermark.
pub fn is_new(stamp: &str, watermark: Option<&str>) -> bool {
    stamp > effective(watermark)
}

/// Greater of `candidate` and the current watermark.
pub fn advance(candidate: &str, current: Option<&str>) -> String {
    let current = effective(current);
    if candidate > current {
        candidate.to_string()
    } else {
        current.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAMPS: [&str; 5] = [
        "20240101000000",
        "20240101000100",
        "20231231235959",
        "20240101000000",
        "20991231235959",
    ];

    #[test]
    fn is_new_matches_string_order() {
        for a in STAMPS {
            for b in STAMPS {
                assert_eq!(is_new(a, Some(b)), a > b, "a={a} b={b}");
            }
        }
    }

    #[test]
    fn missing_watermark_accepts_every_stamp() {
        for s in STAMPS {
            assert!(is_new(s, None));
            assert!(is_new(s, Some("")));
            assert!(is_new(s, Some(SENTINEL)));
        }
        assert!(!is_new("", None));
    }

    #[test]
    fn advance_is_idempotent_and_takes_max() {
        for x in STAMPS {
            for y in STAMPS {
                let once = advance(x, Some(y));
                assert_eq!(advance(&once, Some(y)), once);
                assert_eq!(once, advance(y, Some(x)));
                assert_eq!(once.as_str(), x.max(y));
            }
        }
        assert_eq!(advance("20240101000000", None), "20240101000000");
    }
}
