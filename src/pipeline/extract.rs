//! Region text extraction: the words of a page that fall inside a clip.
//!
//! pdfium exposes text one character at a time, each with its own bounding
//! box. Words are assembled from consecutive characters, breaking at
//! whitespace, at the control characters pdfium inserts between lines, and
//! wherever the next character no longer overlaps the current word
//! vertically. A page's words are built once and then filtered per
//! annotation, since a page may carry many highlights.

use super::geometry::Rect;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One character of page text with its box in reading space. `bounds` is
/// `None` when pdfium cannot locate the character.
#[derive(Debug, Clone, PartialEq)]
pub struct PageChar {
    pub ch: char,
    pub bounds: Option<Rect>,
}

/// A whitespace-delimited run of characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub bbox: Rect,
    pub text: String,
}

/// Group characters into words, preserving extraction order.
pub fn assemble_words(chars: &[PageChar]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;

    for c in chars {
        let bounds = match c.bounds {
            Some(bounds) if !c.ch.is_whitespace() && !c.ch.is_control() => bounds,
            _ => {
                words.extend(current.take());
                continue;
            }
        };

        match current.as_mut() {
            Some(word) if same_line(&word.bbox, &bounds) => {
                word.text.push(c.ch);
                word.bbox = word.bbox.union(&bounds);
            }
            _ => {
                words.extend(current.take());
                current = Some(Word {
                    bbox: bounds,
                    text: c.ch.to_string(),
                });
            }
        }
    }
    words.extend(current);
    words
}

/// The next character continues a word only if its vertical centre lies
/// within the word's vertical extent.
fn same_line(word: &Rect, next: &Rect) -> bool {
    let centre = (next.y0 + next.y1) / 2.0;
    centre >= word.y0 && centre <= word.y1
}

/// Words whose bounding box intersects `clip`, in extraction order.
pub fn words_in_region(words: &[Word], clip: &Rect) -> Vec<Word> {
    words
        .iter()
        .filter(|w| w.bbox.intersects(clip))
        .cloned()
        .collect()
}

/// Read every character of `page` and assemble its words in reading space.
pub fn page_words(page: &PdfPage) -> Result<Vec<Word>, PdfiumError> {
    let page_height = page.height().value;
    let text = page.text()?;

    let chars: Vec<PageChar> = text
        .chars()
        .iter()
        .filter_map(|c| {
            let ch = c.unicode_char()?;
            // Characters without geometry break the current word.
            let bounds = c
                .loose_bounds()
                .ok()
                .map(|rect| Rect::from_pdf(&rect, page_height));
            Some(PageChar { ch, bounds })
        })
        .collect();

    let words = assemble_words(&chars);
    debug!("Page text: {} chars → {} words", chars.len(), words.len());
    Ok(words)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Lay out `text` as 6pt-wide characters starting at `x`, with the
    /// given top and bottom.
    pub(crate) fn chars_of(text: &str, x: f32, top: f32, bottom: f32) -> Vec<PageChar> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| {
                let x0 = x + i as f32 * 6.0;
                PageChar {
                    ch,
                    bounds: Some(Rect::new(x0, top, x0 + 6.0, bottom)),
                }
            })
            .collect()
    }

    #[test]
    fn words_split_on_spaces() {
        let chars = chars_of("def main():", 72.0, 100.0, 112.0);
        let words = assemble_words(&chars);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["def", "main():"]);
        assert_eq!(words[0].bbox, Rect::new(72.0, 100.0, 90.0, 112.0));
    }

    #[test]
    fn words_split_on_generated_newline() {
        let mut chars = chars_of("alpha", 72.0, 100.0, 112.0);
        chars.push(PageChar {
            ch: '\r',
            bounds: None,
        });
        chars.push(PageChar {
            ch: '\n',
            bounds: None,
        });
        chars.extend(chars_of("beta", 72.0, 120.0, 132.0));
        let words = assemble_words(&chars);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].text, "beta");
    }

    #[test]
    fn unlocated_char_breaks_the_word_and_is_dropped() {
        let mut chars = chars_of("foo", 72.0, 100.0, 112.0);
        chars.push(PageChar {
            ch: 'x',
            bounds: None,
        });
        chars.extend(chars_of("bar", 90.0, 100.0, 112.0));
        let words = assemble_words(&chars);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["foo", "bar"]);
        assert!(words.iter().all(|w| w.bbox.x0 >= 72.0));
    }

    #[test]
    fn words_split_when_line_changes_without_separator() {
        let mut chars = chars_of("end", 300.0, 100.0, 112.0);
        chars.extend(chars_of("next", 72.0, 120.0, 132.0));
        let words = assemble_words(&chars);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["end", "next"]);
    }

    #[test]
    fn region_filter_keeps_intersecting_words_in_order() {
        let mut chars = chars_of("outside", 72.0, 50.0, 62.0);
        chars.push(PageChar {
            ch: '\n',
            bounds: None,
        });
        chars.extend(chars_of("keep this", 72.0, 100.0, 112.0));
        let words = assemble_words(&chars);

        let clip = Rect::new(70.0, 98.0, 200.0, 114.0);
        let inside = words_in_region(&words, &clip);
        let texts: Vec<&str> = inside.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["keep", "this"]);
    }

    #[test]
    fn region_without_words_is_empty() {
        let words = assemble_words(&chars_of("text", 72.0, 100.0, 112.0));
        let clip = Rect::new(400.0, 400.0, 500.0, 500.0);
        assert!(words_in_region(&words, &clip).is_empty());
    }
}
