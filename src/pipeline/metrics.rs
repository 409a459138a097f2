//! Static font-metric tables for the standard PDF fonts the crate draws with.
//!
//! Widths are Adobe AFM advance widths in thousandths of an em. Tables cover
//! printable ASCII (0x20..=0x7E, index = `char - 32`); anything else falls
//! back to a per-face table of the few extra glyphs used here, then to an
//! average width. Measuring this way keeps wrapping and alignment pure
//! functions of the text, with no pdfium handle needed.

use serde::{Deserialize, Serialize};

/// A standard-14 face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Courier,
    Symbol,
}

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // :   ;    <    =    >    ?    @
    278, 278, 584, 584, 584, 556, 1015,
    // A-M
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    // N-Z
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [   \    ]    ^    _    `
    278, 278, 278, 469, 556, 333,
    // a-m
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    // n-z
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // {   |    }    ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // :   ;    <    =    >    ?    @
    333, 333, 584, 584, 584, 611, 975,
    // A-M
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    // N-Z
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [   \    ]    ^    _    `
    333, 278, 333, 584, 556, 333,
    // a-m
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    // n-z
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    // {   |    }    ~
    389, 280, 389, 584,
];

/// Symbol glyphs the math typesetter can emit, keyed by Unicode.
#[rustfmt::skip]
static SYMBOL_EXTRA: &[(char, u16)] = &[
    ('α', 631), ('β', 549), ('γ', 411), ('δ', 494), ('ε', 439), ('ζ', 494),
    ('η', 603), ('θ', 521), ('ι', 329), ('κ', 549), ('λ', 549), ('μ', 576),
    ('ν', 521), ('ξ', 493), ('π', 549), ('ρ', 549), ('σ', 603), ('τ', 439),
    ('υ', 576), ('φ', 521), ('χ', 549), ('ψ', 686), ('ω', 686),
    ('Γ', 603), ('Δ', 612), ('Θ', 741), ('Λ', 686), ('Ξ', 645), ('Π', 768),
    ('Σ', 592), ('Φ', 763), ('Ψ', 795), ('Ω', 768),
    ('×', 549), ('÷', 549), ('±', 549), ('≤', 549), ('≥', 549), ('≠', 549),
    ('≈', 549), ('≡', 549), ('∼', 549), ('∝', 713), ('∞', 713), ('∂', 494),
    ('∇', 713), ('∈', 713), ('∀', 713), ('∃', 549), ('⋅', 250), ('′', 247),
    ('→', 987), ('←', 987), ('⇒', 987), ('⇔', 1042), ('↔', 1042),
    ('∑', 713), ('∏', 823), ('∫', 274), ('√', 549), ('−', 549),
];

/// Non-ASCII glyphs drawn in the Helvetica family.
static HELVETICA_EXTRA: &[(char, u16)] = &[('•', 350), ('…', 1000), ('–', 556), ('—', 1000)];

const AVERAGE_WIDTH: u16 = 556;

impl FontFace {
    /// Advance width of `ch` in thousandths of an em.
    pub fn char_units(self, ch: char) -> u16 {
        let code = ch as usize;
        let ascii = (32..=126).contains(&code);
        match self {
            FontFace::Courier => 600,
            FontFace::Helvetica | FontFace::HelveticaOblique if ascii => HELVETICA[code - 32],
            FontFace::HelveticaBold if ascii => HELVETICA_BOLD[code - 32],
            FontFace::Symbol => lookup(SYMBOL_EXTRA, ch)
                .or_else(|| ascii.then(|| HELVETICA[code - 32]))
                .unwrap_or(AVERAGE_WIDTH),
            _ => lookup(HELVETICA_EXTRA, ch).unwrap_or(AVERAGE_WIDTH),
        }
    }

    /// Ascender height in thousandths of an em.
    pub fn ascent_units(self) -> f32 {
        match self {
            FontFace::Courier => 629.0,
            FontFace::Symbol => 1010.0,
            _ => 718.0,
        }
    }

    /// Descender depth (positive) in thousandths of an em.
    pub fn descent_units(self) -> f32 {
        match self {
            FontFace::Courier => 157.0,
            FontFace::Symbol => 293.0,
            _ => 207.0,
        }
    }

    /// True for glyphs this face draws from the Symbol table.
    pub fn is_symbol_char(ch: char) -> bool {
        lookup(SYMBOL_EXTRA, ch).is_some()
    }
}

fn lookup(table: &[(char, u16)], ch: char) -> Option<u16> {
    table.iter().find(|&&(c, _)| c == ch).map(|&(_, w)| w)
}

/// Width of `text` set in `face` at `size` points.
pub fn text_width(face: FontFace, text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(face.char_units(c))).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap. Words are separated by runs of whitespace and rejoined
/// with single spaces. A single word wider than `max_width` is broken by
/// characters.
pub fn wrap_words(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let space = text_width(face, " ", size);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_width = text_width(face, word, size);

        if word_width > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = wrap_chars(word, face, size, max_width);
            // The last piece may share its line with following words.
            if let Some(last) = pieces.pop() {
                lines.extend(pieces);
                current_width = text_width(face, &last, size);
                current = last;
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
        } else if current_width + space + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += space + word_width;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_width = word_width;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Break `text` into pieces no wider than `max_width`, keeping every
/// character (including whitespace). Each piece holds at least one char.
pub fn wrap_chars(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut width = 0.0_f32;
    for ch in text.chars() {
        let w = f32::from(face.char_units(ch)) * size / 1000.0;
        if !current.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(ch);
        width += w;
    }
    if !current.is_empty() || pieces.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_is_monospaced() {
        assert_eq!(text_width(FontFace::Courier, "iiii", 10.0), 24.0);
        assert_eq!(text_width(FontFace::Courier, "WWWW", 10.0), 24.0);
    }

    #[test]
    fn helvetica_widths_match_afm() {
        assert_eq!(FontFace::Helvetica.char_units(' '), 278);
        assert_eq!(FontFace::Helvetica.char_units('W'), 944);
        assert_eq!(FontFace::HelveticaBold.char_units('m'), 889);
        assert_eq!(FontFace::HelveticaOblique.char_units('i'), 222);
        // "Page 1" at 9pt: P667 a556 g556 e556 sp278 1 556 = 3169
        let w = text_width(FontFace::Helvetica, "Page 1", 9.0);
        assert!((w - 28.521).abs() < 1e-3, "got {w}");
    }

    #[test]
    fn unknown_glyphs_use_average_width() {
        assert_eq!(FontFace::Helvetica.char_units('é'), AVERAGE_WIDTH);
        assert_eq!(FontFace::Helvetica.char_units('•'), 350);
        assert_eq!(FontFace::Symbol.char_units('α'), 631);
        assert!(FontFace::is_symbol_char('∑'));
        assert!(!FontFace::is_symbol_char('a'));
    }

    #[test]
    fn wrap_words_is_greedy() {
        // Courier 10pt: 6pt per char. 60pt holds 10 chars.
        let lines = wrap_words("aaaa bbbb cccc dd", FontFace::Courier, 10.0, 60.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dd"]);
    }

    #[test]
    fn wrap_words_collapses_whitespace() {
        let lines = wrap_words("  one \t two  ", FontFace::Courier, 10.0, 600.0);
        assert_eq!(lines, vec!["one two"]);
        assert!(wrap_words("   ", FontFace::Courier, 10.0, 600.0).is_empty());
    }

    #[test]
    fn overlong_word_is_broken_by_characters() {
        let lines = wrap_words("ab abcdefghijklmnop xy", FontFace::Courier, 10.0, 30.0);
        assert_eq!(lines, vec!["ab", "abcde", "fghij", "klmno", "p xy"]);
    }

    #[test]
    fn wrap_chars_keeps_whitespace() {
        let pieces = wrap_chars("    x = 1;", FontFace::Courier, 10.0, 36.0);
        assert_eq!(pieces, vec!["    x ", "= 1;"]);
        assert_eq!(pieces.concat(), "    x = 1;");
    }

    #[test]
    fn wrap_chars_of_empty_is_one_empty_piece() {
        assert_eq!(wrap_chars("", FontFace::Courier, 10.0, 36.0), vec![String::new()]);
    }
}
