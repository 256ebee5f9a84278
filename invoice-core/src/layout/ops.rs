use crate::fonts::Font;
use crate::graphics::Color;
use crate::image::{ImageData, ImageId};

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4, 210 × 297 mm.
    pub const A4: PageSize = PageSize {
        width: 595.275_590_551_181_1,
        height: 841.889_763_779_527_6,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

/// Horizontal anchoring of a text run. For `Right` the run's `x` is its
/// right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// One absolutely positioned drawing instruction. Coordinates use a
/// bottom-left origin.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        text: String,
        font: Font,
        size: f64,
        color: Color,
        align: TextAlign,
    },
    /// Stroked 1pt black line.
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Image {
        image: ImageId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
}

impl DrawOp {
    /// The text of a `Text` op, `None` for everything else.
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// A laid-out single-page invoice, independent of any output format.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    pub page: PageSize,
    pub title: String,
    pub ops: Vec<DrawOp>,
    pub images: Vec<ImageData>,
    pub subtotal: f64,
    pub total: f64,
}

impl InvoiceDocument {
    /// All text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::text)
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageData> {
        self.images.get(id.0)
    }
}
