//! Built-in Type1 fonts used by the invoice and their metrics.
//!
//! Only the two Helvetica faces the invoice draws with are supported. Both
//! are standard PDF fonts, so nothing is embedded; text is written in
//! WinAnsiEncoding so characters such as `•` survive.

/// A standard PDF font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    pub const ALL: [Font; 2] = [Font::Helvetica, Font::HelveticaBold];

    /// Resource name used in content streams (e.g. "F1").
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// PDF BaseFont name.
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }
}

/// Helvetica widths for ASCII 32..=126, 1/1000 em (Adobe AFM).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold widths for ASCII 32..=126, 1/1000 em (Adobe AFM).
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const BULLET_WIDTH: u16 = 350;
const DEFAULT_WIDTH: u16 = 278;

/// Map a char to its WinAnsiEncoding byte, `None` if it has no slot.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match ch {
        ' '..='~' => Some(code as u8),
        '\u{a0}'..='\u{ff}' => Some(code as u8),
        '€' => Some(0x80),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '™' => Some(0x99),
        _ => None,
    }
}

/// Encode text for a WinAnsi font. Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| win_ansi_byte(ch).unwrap_or(b'?'))
        .collect()
}

/// Width of one WinAnsi code in 1/1000 em.
pub fn code_width(font: Font, code: u8) -> u16 {
    match code {
        32..=126 => {
            let index = (code - 32) as usize;
            match font {
                Font::Helvetica => HELVETICA_WIDTHS[index],
                Font::HelveticaBold => HELVETICA_BOLD_WIDTHS[index],
            }
        }
        0x95 => BULLET_WIDTH,
        _ => DEFAULT_WIDTH,
    }
}

/// Width of `text` in points when set in `font` at `font_size`.
pub fn measure_text(text: &str, font: Font, font_size: f64) -> f64 {
    let total: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|code| code_width(font, code) as u32)
        .sum();
    total as f64 * font_size / 1000.0
}
