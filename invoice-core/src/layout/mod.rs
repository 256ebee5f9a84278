//! Single-page invoice layout.
//!
//! The page is built top to bottom in bands: header, invoice info, table
//! header, one block per line item, payment method, totals and footer. Each
//! band is positioned from the page edges, and the item table is driven by a
//! vertical cursor that every row and detail line moves down. Bands below
//! the table follow the cursor; there is no overflow handling, so a very
//! long item list runs into them.

pub mod items;
pub mod ops;

use std::path::PathBuf;

use crate::error::Result;
use crate::fonts::Font;
use crate::graphics::{Color, Rect};
use crate::image::{self, fit_within, ImageData, ImageId};
use crate::model::{InvoiceRecord, LineItem};

pub use items::{sub_lines, Indent, SubLine, MAX_IMEIS};
pub use ops::{DrawOp, InvoiceDocument, PageSize, TextAlign};

/// The shop printed on every invoice.
struct Business {
    name: &'static str,
    address_lines: [&'static str; 3],
    phone: &'static str,
    footer_address: &'static str,
}

const SHOP: Business = Business {
    name: "Chaudhary Mobile Shop",
    address_lines: [
        "Rashid Chaudhary",
        "Near Allahbad Bank",
        "Maudaha, Hamirpur 210507",
    ],
    phone: "+91 7268937279",
    footer_address: "Near Allahbad Bank, Maudaha, Hamirpur 210507",
};

const STRIP_COLOR: &str = "#e0c36a";

const MARGIN: f64 = 40.0;
/// Left edge of the right-hand info and summary columns, from the right edge.
const RIGHT_COLUMN: f64 = 200.0;
const LOGO_SIZE: f64 = 60.0;

const COL_QTY: f64 = 300.0;
const COL_PRICE: f64 = 380.0;
const COL_TOTAL: f64 = 470.0;
/// Values sit slightly right of their column labels.
const VALUE_NUDGE: f64 = 10.0;

const ROW_HEIGHT: f64 = 15.0;
const SUB_LINE_HEIGHT: f64 = 12.0;
const ROW_GAP: f64 = 10.0;
const DETAIL_X: f64 = 60.0;
const BULLET_X: f64 = 80.0;

const FOOTER_STRIP_HEIGHT: f64 = 40.0;

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub page: PageSize,
    /// Logo drawn in the header; a path that does not exist means no logo.
    pub logo_path: Option<PathBuf>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            page: PageSize::A4,
            logo_path: Some(PathBuf::from("assets/RLogo.png")),
        }
    }
}

/// Lay out `record`, reading the logo named by `options` if it exists.
pub fn layout_invoice(record: &InvoiceRecord, options: &LayoutOptions) -> Result<InvoiceDocument> {
    let logo = options.logo_path.as_deref().and_then(image::load_logo);
    layout_with_logo(record, options.page, logo)
}

/// Lay out `record` with an already decoded logo. Performs no I/O.
pub fn layout_with_logo(
    record: &InvoiceRecord,
    page: PageSize,
    logo: Option<ImageData>,
) -> Result<InvoiceDocument> {
    record.check_required()?;

    let mut canvas = Canvas::new(page);
    let mut images = Vec::new();

    if let Some(logo) = logo {
        let bounds = Rect::new(MARGIN, page.height - 90.0, LOGO_SIZE, LOGO_SIZE);
        let placed = fit_within(logo.width, logo.height, &bounds);
        canvas.image(ImageId(images.len()), placed);
        images.push(logo);
    }

    draw_header(&mut canvas);
    let info_y = draw_invoice_info(&mut canvas, record);
    let table_y = draw_table_header(&mut canvas, info_y - 100.0);
    let (row_y, subtotal) = draw_items(&mut canvas, &record.items, table_y - 30.0);

    let payment_y = row_y - 40.0;
    draw_payment(&mut canvas, payment_y, record.payment_mode_label());

    // No tax or discount lines: the total is the subtotal.
    let total = subtotal;
    draw_summary(&mut canvas, payment_y, subtotal, total);
    draw_footer(&mut canvas);

    let invoice_no = record.invoice_no.as_deref().unwrap_or("N/A");
    log::debug!(
        "laid out invoice {} ({} items, {} ops, subtotal {})",
        invoice_no,
        record.items.len(),
        canvas.ops.len(),
        subtotal
    );

    Ok(InvoiceDocument {
        page,
        title: format!("Invoice {invoice_no}"),
        ops: canvas.ops,
        images,
        subtotal,
        total,
    })
}

/// Render an amount as a plain number: `15000`, `199.50`.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

fn draw_header(canvas: &mut Canvas) {
    let (w, h) = (canvas.page.width, canvas.page.height);

    canvas.set_font(Font::HelveticaBold, 16.0);
    canvas.text(110.0, h - 50.0, SHOP.name);

    canvas.set_font(Font::Helvetica, 9.0);
    let mut y = h - 65.0;
    for line in SHOP.address_lines {
        canvas.text(110.0, y, line);
        y -= 15.0;
    }
    canvas.text(110.0, y, SHOP.phone);

    canvas.set_font(Font::HelveticaBold, 28.0);
    canvas.text_right(w - MARGIN, h - 55.0, "INVOICE");
}

/// Returns the band's top y, which the table is positioned from.
fn draw_invoice_info(canvas: &mut Canvas, record: &InvoiceRecord) -> f64 {
    let (w, h) = (canvas.page.width, canvas.page.height);
    let y = h - 140.0;
    let right = w - RIGHT_COLUMN;

    canvas.set_font(Font::HelveticaBold, 10.0);
    canvas.text(MARGIN, y, "Invoice to:");
    canvas.text(right, y, "Invoice#");

    canvas.set_font(Font::Helvetica, 10.0);
    canvas.text(MARGIN, y - 18.0, &record.customer.name);
    canvas.text(right, y - 18.0, record.invoice_no.as_deref().unwrap_or("N/A"));
    canvas.text(MARGIN, y - 35.0, &record.customer.address);
    canvas.text(right, y - 35.0, "Date");
    canvas.text(right, y - 52.0, record.date.as_deref().unwrap_or(""));

    canvas.rule(y - 75.0);
    y
}

fn draw_table_header(canvas: &mut Canvas, y: f64) -> f64 {
    canvas.set_font(Font::HelveticaBold, 10.0);
    canvas.text(MARGIN, y, "Item");
    canvas.text(COL_QTY, y, "Qty");
    canvas.text(COL_PRICE, y, "Unit Price");
    canvas.text(COL_TOTAL, y, "Total");
    canvas.rule(y - 8.0);
    y
}

/// Draws every item starting at `row_y`. Returns the cursor after the last
/// row and the accumulated subtotal.
fn draw_items(canvas: &mut Canvas, items: &[LineItem], mut row_y: f64) -> (f64, f64) {
    let mut subtotal = 0.0;

    for item in items {
        let total = item.total();
        subtotal += total;

        canvas.set_font(Font::Helvetica, 10.0);
        canvas.text(MARGIN, row_y, &item.name);
        canvas.text(COL_QTY + VALUE_NUDGE, row_y, &item.qty.to_string());
        canvas.text(COL_PRICE + VALUE_NUDGE, row_y, &format_amount(item.price));
        canvas.text(COL_TOTAL, row_y, &format_amount(total));
        row_y -= ROW_HEIGHT;

        canvas.set_font(Font::Helvetica, 9.0);
        for line in sub_lines(item) {
            let x = match line.indent {
                Indent::Detail => DETAIL_X,
                Indent::Bullet => BULLET_X,
            };
            canvas.text(x, row_y, &line.text);
            row_y -= SUB_LINE_HEIGHT;
        }

        row_y -= ROW_GAP;
        canvas.rule(row_y + 5.0);
    }

    (row_y, subtotal)
}

fn draw_payment(canvas: &mut Canvas, y: f64, mode: &str) {
    canvas.set_font(Font::HelveticaBold, 10.0);
    canvas.text(MARGIN, y, "PAYMENT METHOD");
    canvas.set_font(Font::Helvetica, 10.0);
    canvas.text(MARGIN, y - 20.0, &format!("Mode: {mode}"));
}

fn draw_summary(canvas: &mut Canvas, y: f64, subtotal: f64, total: f64) {
    let w = canvas.page.width;

    canvas.set_font(Font::Helvetica, 10.0);
    canvas.text(w - RIGHT_COLUMN, y, "Subtotal");
    canvas.text_right(w - MARGIN, y, &format_amount(subtotal));

    canvas.set_font(Font::HelveticaBold, 16.0);
    canvas.text(w - RIGHT_COLUMN, y - 55.0, "Total");
    canvas.text_right(w - MARGIN, y - 55.0, &format_amount(total));
}

fn draw_footer(canvas: &mut Canvas) {
    let w = canvas.page.width;

    canvas.set_font(Font::Helvetica, 10.0);
    canvas.text(MARGIN, 120.0, "Thank you for your business!");
    canvas.line(w - RIGHT_COLUMN, 130.0, w - MARGIN, 130.0);
    canvas.text(w - 170.0, 110.0, "Authorized Signature");

    let strip = Color::from_hex(STRIP_COLOR).unwrap_or(Color::BLACK);
    canvas.fill_rect(Rect::new(0.0, 0.0, w, FOOTER_STRIP_HEIGHT), strip);

    canvas.set_color(Color::WHITE);
    canvas.set_font(Font::Helvetica, 9.0);
    canvas.text(MARGIN, 15.0, SHOP.phone);
    canvas.text_right(w - MARGIN, 15.0, SHOP.footer_address);
}

/// Op recorder with a current font and fill color, so bands read like a
/// sequence of pen moves.
struct Canvas {
    page: PageSize,
    ops: Vec<DrawOp>,
    font: Font,
    size: f64,
    color: Color,
}

impl Canvas {
    fn new(page: PageSize) -> Self {
        Canvas {
            page,
            ops: Vec::new(),
            font: Font::Helvetica,
            size: 10.0,
            color: Color::BLACK,
        }
    }

    fn set_font(&mut self, font: Font, size: f64) {
        self.font = font;
        self.size = size;
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn push_text(&mut self, x: f64, y: f64, text: &str, align: TextAlign) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font: self.font,
            size: self.size,
            color: self.color,
            align,
        });
    }

    fn text(&mut self, x: f64, y: f64, text: &str) {
        self.push_text(x, y, text, TextAlign::Left);
    }

    fn text_right(&mut self, x: f64, y: f64, text: &str) {
        self.push_text(x, y, text, TextAlign::Right);
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(DrawOp::Line { x1, y1, x2, y2 });
    }

    /// Full-width rule between the page margins.
    fn rule(&mut self, y: f64) {
        let right = self.page.width - MARGIN;
        self.line(MARGIN, y, right, y);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            color,
        });
    }

    fn image(&mut self, image: ImageId, placed: Rect) {
        self.ops.push(DrawOp::Image {
            image,
            x: placed.x,
            y: placed.y,
            width: placed.width,
            height: placed.height,
        });
    }
}
