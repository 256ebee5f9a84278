//! Page content stream operators.

use std::fmt::Write as _;

use crate::fonts::{encode_win_ansi, Font};
use crate::graphics::Color;
use crate::pdf::writer::{format_number, write_string};

/// Accumulates content-stream operators for one page.
///
/// Fill and stroke colors are tracked so redundant `rg`/`RG` operators are
/// not emitted between consecutive runs of the same color.
#[derive(Debug, Default)]
pub struct ContentStream {
    buf: Vec<u8>,
    fill: Option<Color>,
    stroke: Option<Color>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn op(&mut self, operands: &[f64], operator: &str) {
        let mut line = String::new();
        for v in operands {
            let _ = write!(line, "{} ", format_number(*v));
        }
        line.push_str(operator);
        line.push('\n');
        self.buf.extend_from_slice(line.as_bytes());
    }

    /// `q`. Color state set inside is forgotten on the matching restore.
    pub fn save(&mut self) -> &mut Self {
        self.buf.extend_from_slice(b"q\n");
        self
    }

    pub fn restore(&mut self) -> &mut Self {
        self.buf.extend_from_slice(b"Q\n");
        self.fill = None;
        self.stroke = None;
        self
    }

    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        if self.fill != Some(color) {
            self.op(&[color.r, color.g, color.b], "rg");
            self.fill = Some(color);
        }
        self
    }

    pub fn stroke_color(&mut self, color: Color) -> &mut Self {
        if self.stroke != Some(color) {
            self.op(&[color.r, color.g, color.b], "RG");
            self.stroke = Some(color);
        }
        self
    }

    pub fn line_width(&mut self, width: f64) -> &mut Self {
        self.op(&[width], "w");
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(&[x, y], "m");
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(&[x, y], "l");
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.buf.extend_from_slice(b"S\n");
        self
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.op(&[x, y, width, height], "re");
        self
    }

    pub fn fill(&mut self) -> &mut Self {
        self.buf.extend_from_slice(b"f\n");
        self
    }

    /// A single text object at (x, y), baseline-left.
    pub fn text(&mut self, font: Font, size: f64, x: f64, y: f64, text: &str) -> &mut Self {
        self.buf.extend_from_slice(
            format!("BT\n/{} {} Tf\n", font.pdf_name(), format_number(size)).as_bytes(),
        );
        self.op(&[x, y], "Td");
        write_string(&encode_win_ansi(text), &mut self.buf);
        self.buf.extend_from_slice(b" Tj\nET\n");
        self
    }

    /// Paint the XObject `/Im{index}` into the given rectangle.
    pub fn draw_image(&mut self, index: usize, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.save();
        self.op(&[width, 0.0, 0.0, height, x, y], "cm");
        self.buf
            .extend_from_slice(format!("/Im{index} Do\n").as_bytes());
        self.restore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(cs: ContentStream) -> String {
        String::from_utf8(cs.into_bytes()).unwrap()
    }

    #[test]
    fn text_object() {
        let mut cs = ContentStream::new();
        cs.text(Font::HelveticaBold, 16.0, 110.0, 791.8898, "Shop (Main)");
        assert_eq!(
            output(cs),
            "BT\n/F2 16 Tf\n110 791.8898 Td\n(Shop \\(Main\\)) Tj\nET\n"
        );
    }

    #[test]
    fn bullet_is_win_ansi_byte() {
        let mut cs = ContentStream::new();
        cs.text(Font::Helvetica, 9.0, 80.0, 100.0, "• Serial");
        let bytes = cs.into_bytes();
        assert!(bytes.windows(9).any(|w| w == b"(\x95 Serial"));
    }

    #[test]
    fn repeated_fill_color_is_emitted_once() {
        let mut cs = ContentStream::new();
        cs.fill_color(Color::BLACK)
            .fill_color(Color::BLACK)
            .fill_color(Color::WHITE);
        assert_eq!(output(cs), "0 0 0 rg\n1 1 1 rg\n");
    }

    #[test]
    fn restore_forgets_colors() {
        let mut cs = ContentStream::new();
        cs.save().fill_color(Color::WHITE).restore().fill_color(Color::WHITE);
        assert_eq!(output(cs), "q\n1 1 1 rg\nQ\n1 1 1 rg\n");
    }

    #[test]
    fn line_and_rect() {
        let mut cs = ContentStream::new();
        cs.move_to(40.0, 626.5).line_to(555.2756, 626.5).stroke();
        cs.rect(0.0, 0.0, 595.2756, 40.0).fill();
        assert_eq!(
            output(cs),
            "40 626.5 m\n555.2756 626.5 l\nS\n0 0 595.2756 40 re\nf\n"
        );
    }

    #[test]
    fn image_is_wrapped_in_save_restore() {
        let mut cs = ContentStream::new();
        cs.draw_image(0, 40.0, 751.89, 60.0, 60.0);
        assert_eq!(output(cs), "q\n60 0 0 60 40 751.89 cm\n/Im0 Do\nQ\n");
    }
}
