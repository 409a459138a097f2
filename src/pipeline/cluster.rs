//! Line clustering: group a region's words into horizontal text lines.
//!
//! Two words belong to the same line iff their bottom edges, rounded to one
//! decimal place, are equal. This is exact equality on the rounded value, not
//! a tolerance band: words jittered across a rounding boundary (say 100.04
//! and 100.06) land on different lines. Exact halves round to even, so
//! 100.25 joins 100.2 while 100.75 joins 100.8.

use super::extract::Word;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A clustered line of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    /// Bottom edge in tenths of a point (reading space).
    pub key: i64,
    pub text: String,
}

impl TextLine {
    /// Bottom edge in points, as rounded for clustering.
    pub fn y(&self) -> f32 {
        self.key as f32 / 10.0
    }
}

/// Clustering key for a bottom edge: the coordinate rounded to one decimal,
/// held as an integer number of tenths so it compares exactly.
///
/// The product is exact in `f64`, so ties are real ties and go to even.
pub fn line_key(bottom: f32) -> i64 {
    (f64::from(bottom) * 10.0).round_ties_even() as i64
}

/// Group `words` into lines ordered top to bottom.
///
/// Within a line words keep their encounter order (they are not re-sorted by
/// `x`) and are joined by single spaces. Lines that trim to nothing are
/// dropped.
pub fn cluster_lines(words: &[Word]) -> Vec<TextLine> {
    let mut groups: BTreeMap<i64, Vec<&str>> = BTreeMap::new();
    for word in words {
        groups
            .entry(line_key(word.bbox.y1))
            .or_default()
            .push(word.text.as_str());
    }

    groups
        .into_iter()
        .filter_map(|(key, parts)| {
            let text = parts.join(" ").trim().to_string();
            (!text.is_empty()).then_some(TextLine { key, text })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::geometry::Rect;

    fn word(text: &str, x: f32, bottom: f32) -> Word {
        Word {
            bbox: Rect::new(x, bottom - 12.0, x + 30.0, bottom),
            text: text.to_string(),
        }
    }

    #[test]
    fn groups_by_rounded_bottom_and_sorts_top_down() {
        let words = vec![
            word("second", 72.0, 140.02),
            word("first", 72.0, 120.0),
            word("line", 110.0, 140.04),
        ];
        let lines = cluster_lines(&words);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second line");
        assert_eq!(lines[1].key, 1400);
        assert!((lines[1].y() - 140.0).abs() < f32::EPSILON);
    }

    #[test]
    fn keeps_extraction_order_within_a_line() {
        // "b" sits to the left of "a" but was extracted after it.
        let words = vec![word("a", 200.0, 100.0), word("b", 72.0, 100.0)];
        let lines = cluster_lines(&words);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "a b");

        let reversed = vec![word("b", 72.0, 100.0), word("a", 200.0, 100.0)];
        assert_eq!(cluster_lines(&reversed)[0].text, "b a");
    }

    #[test]
    fn jitter_across_rounding_boundary_splits_the_line() {
        // 100.04 rounds to 100.0, 100.06 rounds to 100.1.
        let words = vec![word("x", 72.0, 100.04), word("= 1", 90.0, 100.06)];
        let lines = cluster_lines(&words);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "x");
        assert_eq!(lines[1].text, "= 1");
    }

    #[test]
    fn jitter_within_rounding_bucket_stays_together() {
        let words = vec![word("x", 72.0, 100.01), word("= 1", 90.0, 100.04)];
        let lines = cluster_lines(&words);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "x = 1");
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(line_key(100.25), 1002);
        assert_eq!(line_key(100.75), 1008);
        assert_eq!(line_key(100.35), 1003);

        let words = vec![
            word("a", 72.0, 100.2),
            word("b", 90.0, 100.25),
            word("c", 108.0, 100.3),
        ];
        let texts: Vec<String> = cluster_lines(&words).into_iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["a b", "c"]);
    }

    #[test]
    fn blank_lines_are_dropped() {
        let words = vec![word("  ", 72.0, 100.0), word("kept", 72.0, 120.0)];
        let lines = cluster_lines(&words);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "kept");
    }

    #[test]
    fn no_words_no_lines() {
        assert!(cluster_lines(&[]).is_empty());
    }
}
