//! PDF output for laid-out invoices.
//!
//! [`PdfRenderer`] turns an [`InvoiceDocument`] into a single-page PDF 1.7
//! file using the two built-in Helvetica faces. Any other output format can
//! be plugged in through [`RenderBackend`].

pub mod content;
pub mod objects;
pub mod writer;

use std::io::{self, Write};

use crate::error::Result;
use crate::fonts::{measure_text, Font};
use crate::graphics::Color;
use crate::image::{ImageData, ImageFormat};
use crate::layout::{DrawOp, InvoiceDocument, TextAlign};

use content::ContentStream;
use objects::{ObjId, PdfObject};
use writer::PdfWriter;

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FONT_HELV_OBJ: ObjId = ObjId(3, 0);
const FONT_HELV_BOLD_OBJ: ObjId = ObjId(4, 0);
const PAGE_OBJ: ObjId = ObjId(5, 0);
const CONTENT_OBJ: ObjId = ObjId(6, 0);
/// Images, their soft masks and the info dictionary are numbered from here.
const FIRST_FREE_OBJ: u32 = 7;

/// Something that can turn a laid-out invoice into file bytes.
pub trait RenderBackend {
    fn render(&self, doc: &InvoiceDocument) -> Result<Vec<u8>>;
}

/// Writes invoices as PDF.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    /// Flate-compress the content stream and PNG image data.
    pub compress: bool,
    /// Extra info dictionary entries, written after `Title` and `Producer`.
    pub info: Vec<(String, String)>,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        PdfRenderer {
            compress: true,
            info: Vec::new(),
        }
    }
}

impl PdfRenderer {
    pub fn new(compress: bool) -> Self {
        PdfRenderer {
            compress,
            ..Default::default()
        }
    }

    /// Add an info dictionary entry such as `Author`.
    pub fn with_info(mut self, key: &str, value: &str) -> Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// Write the PDF for `doc` to `out`, returning the writer.
    pub fn render_to<W: Write>(&self, doc: &InvoiceDocument, out: W) -> io::Result<W> {
        let mut w = PdfWriter::new(out);
        w.write_header()?;

        for font in Font::ALL {
            w.write_object(font_obj(font), &font_dict(font))?;
        }

        let mut next = FIRST_FREE_OBJ;
        let mut xobjects = Vec::new();
        for (index, image) in doc.images.iter().enumerate() {
            let image_id = ObjId(next, 0);
            next += 1;
            let smask_id = match &image.alpha {
                Some(alpha) => {
                    let id = ObjId(next, 0);
                    next += 1;
                    w.write_object(id, &self.smask_object(image, alpha)?)?;
                    Some(id)
                }
                None => None,
            };
            w.write_object(image_id, &self.image_object(image, smask_id)?)?;
            xobjects.push((format!("Im{index}"), PdfObject::Reference(image_id)));
        }

        let ops = content_bytes(doc);
        let content = if self.compress {
            PdfObject::flate_stream(vec![], &ops)?
        } else {
            PdfObject::stream(vec![], ops)
        };
        w.write_object(CONTENT_OBJ, &content)?;

        let mut resources = vec![(
            "Font".to_string(),
            PdfObject::dict(
                Font::ALL
                    .iter()
                    .map(|f| (f.pdf_name(), PdfObject::Reference(font_obj(*f))))
                    .collect(),
            ),
        )];
        if !xobjects.is_empty() {
            resources.push(("XObject".to_string(), PdfObject::Dictionary(xobjects)));
        }

        let page = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PAGES_OBJ.into()),
            (
                "MediaBox",
                PdfObject::rect(0.0, 0.0, doc.page.width, doc.page.height),
            ),
            ("Contents", CONTENT_OBJ.into()),
            ("Resources", PdfObject::Dictionary(resources)),
        ]);
        w.write_object(PAGE_OBJ, &page)?;

        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(vec![PAGE_OBJ.into()])),
            ("Count", PdfObject::Integer(1)),
        ]);
        w.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PAGES_OBJ.into()),
        ]);
        w.write_object(CATALOG_OBJ, &catalog)?;

        let info_id = ObjId(next, 0);
        let mut info = vec![
            ("Title", PdfObject::text(&doc.title)),
            ("Producer", PdfObject::text(concat!("invoice-core ", env!("CARGO_PKG_VERSION")))),
        ];
        for (key, value) in &self.info {
            info.push((key.as_str(), PdfObject::text(value)));
        }
        w.write_object(info_id, &PdfObject::dict(info))?;

        w.finish(CATALOG_OBJ, Some(info_id))
    }

    fn image_object(&self, image: &ImageData, smask: Option<ObjId>) -> io::Result<PdfObject> {
        let mut entries = vec![
            ("Type", PdfObject::name("XObject")),
            ("Subtype", PdfObject::name("Image")),
            ("Width", PdfObject::Integer(image.width as i64)),
            ("Height", PdfObject::Integer(image.height as i64)),
            ("ColorSpace", PdfObject::name(image.color_space.pdf_name())),
            ("BitsPerComponent", PdfObject::Integer(8)),
        ];
        if let Some(id) = smask {
            entries.push(("SMask", id.into()));
        }
        match image.format {
            ImageFormat::Jpeg => {
                entries.push(("Filter", PdfObject::name("DCTDecode")));
                Ok(PdfObject::stream(entries, image.data.clone()))
            }
            ImageFormat::Png => self.sample_stream(entries, &image.data),
        }
    }

    fn smask_object(&self, image: &ImageData, alpha: &[u8]) -> io::Result<PdfObject> {
        let entries = vec![
            ("Type", PdfObject::name("XObject")),
            ("Subtype", PdfObject::name("Image")),
            ("Width", PdfObject::Integer(image.width as i64)),
            ("Height", PdfObject::Integer(image.height as i64)),
            ("ColorSpace", PdfObject::name("DeviceGray")),
            ("BitsPerComponent", PdfObject::Integer(8)),
        ];
        self.sample_stream(entries, alpha)
    }

    fn sample_stream(&self, entries: Vec<(&str, PdfObject)>, data: &[u8]) -> io::Result<PdfObject> {
        if self.compress {
            PdfObject::flate_stream(entries, data)
        } else {
            Ok(PdfObject::stream(entries, data.to_vec()))
        }
    }
}

impl RenderBackend for PdfRenderer {
    fn render(&self, doc: &InvoiceDocument) -> Result<Vec<u8>> {
        let bytes = self.render_to(doc, Vec::new())?;
        log::debug!(
            "rendered {:?} to {} bytes (compress={})",
            doc.title,
            bytes.len(),
            self.compress
        );
        Ok(bytes)
    }
}

fn font_obj(font: Font) -> ObjId {
    match font {
        Font::Helvetica => FONT_HELV_OBJ,
        Font::HelveticaBold => FONT_HELV_BOLD_OBJ,
    }
}

fn font_dict(font: Font) -> PdfObject {
    PdfObject::dict(vec![
        ("Type", PdfObject::name("Font")),
        ("Subtype", PdfObject::name("Type1")),
        ("BaseFont", PdfObject::name(font.base_name())),
        ("Encoding", PdfObject::name("WinAnsiEncoding")),
    ])
}

/// Translate draw ops into page content operators.
fn content_bytes(doc: &InvoiceDocument) -> Vec<u8> {
    let mut cs = ContentStream::new();
    cs.stroke_color(Color::BLACK).line_width(1.0);

    for op in &doc.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                font,
                size,
                color,
                align,
            } => {
                let x = match align {
                    TextAlign::Left => *x,
                    TextAlign::Right => x - measure_text(text, *font, *size),
                };
                cs.fill_color(*color).text(*font, *size, x, *y, text);
            }
            DrawOp::Line { x1, y1, x2, y2 } => {
                cs.move_to(*x1, *y1).line_to(*x2, *y2).stroke();
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                cs.fill_color(*color).rect(*x, *y, *width, *height).fill();
            }
            DrawOp::Image {
                image,
                x,
                y,
                width,
                height,
            } => {
                if doc.image(*image).is_some() {
                    cs.draw_image(image.0, *x, *y, *width, *height);
                } else {
                    log::warn!("draw op references missing image {}", image.0);
                }
            }
        }
    }
    cs.into_bytes()
}
