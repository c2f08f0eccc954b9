//! Advance widths for the three base-14 fonts the edition is set in.
//!
//! Values are the Adobe AFM widths (1/1000 em) for printable ASCII, 32..=126,
//! plus the WinAnsi punctuation feeds commonly use (dashes, curly quotes,
//! ellipsis). Anything else is measured with the font's average width.

use printpdf::BuiltinFont;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    TimesBold,
    TimesItalic,
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

/// Widths outside ASCII as `(Helvetica, Times-Bold, Times-Italic)`.
fn punctuation(c: char) -> Option<(u16, u16, u16)> {
    let widths = match c {
        '\u{a0}' => (278, 250, 250),
        '\u{2013}' => (556, 500, 500),
        '\u{2014}' => (1000, 1000, 889),
        '\u{2026}' => (1000, 1000, 889),
        '\u{2018}' | '\u{2019}' | '\u{201a}' => (222, 333, 333),
        '\u{201c}' | '\u{201d}' | '\u{201e}' => (333, 500, 556),
        '\u{2022}' => (350, 350, 350),
        '\u{2020}' => (556, 500, 500),
        '\u{2122}' => (1000, 1000, 980),
        '\u{ab}' | '\u{bb}' => (556, 500, 500),
        '\u{a9}' | '\u{ae}' => (737, 747, 760),
        '\u{b0}' => (400, 400, 400),
        _ => return None,
    };
    Some(widths)
}

impl Font {
    fn table(self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA,
            Font::TimesBold => &TIMES_BOLD,
            Font::TimesItalic => &TIMES_ITALIC,
        }
    }

    fn fallback(self) -> u16 {
        match self {
            Font::Helvetica => 556,
            Font::TimesBold | Font::TimesItalic => 500,
        }
    }

    pub fn builtin(self) -> BuiltinFont {
        match self {
            Font::Helvetica => BuiltinFont::Helvetica,
            Font::TimesBold => BuiltinFont::TimesBold,
            Font::TimesItalic => BuiltinFont::TimesItalic,
        }
    }

    fn char_units(self, c: char) -> u16 {
        match c as u32 {
            code @ 32..=126 => self.table()[(code - 32) as usize],
            _ => match (punctuation(c), self) {
                (Some((w, _, _)), Font::Helvetica) => w,
                (Some((_, w, _)), Font::TimesBold) => w,
                (Some((_, _, w)), Font::TimesItalic) => w,
                (None, _) => self.fallback(),
            },
        }
    }

    /// Width of `text` in points at `size`.
    pub fn width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_units(c))).sum();
        units as f32 * size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(Font::Helvetica.width(" ", 1000.0), 278.0);
        assert_eq!(Font::Helvetica.width("W", 10.0), 9.44);
        assert_eq!(Font::TimesBold.width("m", 1000.0), 833.0);
        assert_eq!(Font::TimesItalic.width("~", 1000.0), 541.0);
    }

    #[test]
    fn test_width_scales_with_size_and_length() {
        let one = Font::TimesBold.width("Watchman", 10.0);
        assert!((Font::TimesBold.width("Watchman", 20.0) - 2.0 * one).abs() < 1e-3);
        assert!((Font::TimesBold.width("WatchmanWatchman", 10.0) - 2.0 * one).abs() < 1e-3);
    }

    #[test]
    fn test_non_ascii_uses_average_width() {
        assert_eq!(Font::Helvetica.width("é", 1000.0), 556.0);
        assert_eq!(Font::TimesItalic.width("ß", 1000.0), 500.0);
    }

    #[test]
    fn test_common_punctuation_widths() {
        assert_eq!(Font::Helvetica.width("\u{2014}", 1000.0), 1000.0);
        assert_eq!(Font::Helvetica.width("\u{2026}", 1000.0), 1000.0);
        assert_eq!(Font::Helvetica.width("\u{2019}", 1000.0), 222.0);
        assert_eq!(Font::TimesBold.width("\u{201c}\u{201d}", 1000.0), 1000.0);
        assert_eq!(Font::TimesItalic.width("\u{2013}", 1000.0), 500.0);
    }
}
