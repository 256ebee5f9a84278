use std::io::Read;

use flate2::read::ZlibDecoder;
use invoice_core::layout::{layout_with_logo, PageSize};
use invoice_core::image::load_image;
use invoice_core::model::{Category, ChargerInfo, Customer, InvoiceRecord, LineItem};
use invoice_core::{PdfRenderer, RenderBackend};

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn sample_record() -> InvoiceRecord {
    let mut phone = LineItem::new(Category::Phone, "Redmi Note 13", 1, 15000.0);
    phone.imei = vec!["861234567890123".to_string()];
    phone.charger_included = true;
    phone.charger = Some(ChargerInfo {
        name: "Fast Charger".to_string(),
        serial: "CHG001".to_string(),
    });
    InvoiceRecord {
        invoice_no: Some("0000012".to_string()),
        date: Some("18-10-2026".to_string()),
        customer: Customer {
            name: "Asha (Shop 4)".to_string(),
            address: "Main Bazaar".to_string(),
        },
        items: vec![phone],
        payment: None,
    }
}

fn rgba_logo() -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, 2, 2);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[10u8; 2 * 2 * 4]).unwrap();
    }
    out
}

/// Offset of `N 0 obj` as recorded in the xref table.
fn xref_offset(pdf: &[u8], obj: usize) -> usize {
    let text = String::from_utf8_lossy(pdf);
    let start = text.rfind("\nxref\n").unwrap() + 1;
    let table = &text[start..];
    let first_row = table.find('\n').unwrap() + 1;
    let header_end = first_row + table[first_row..].find('\n').unwrap() + 1;
    let row = &table[header_end + obj * 20..header_end + obj * 20 + 10];
    row.parse().unwrap()
}

#[test]
fn uncompressed_invoice_is_a_valid_single_page() {
    let doc = layout_with_logo(&sample_record(), PageSize::A4, None).unwrap();
    let pdf = PdfRenderer::new(false).render(&doc).unwrap();

    assert!(pdf.starts_with(b"%PDF-1.7\n"));
    assert!(pdf.ends_with(b"%%EOF\n"));
    assert!(contains_bytes(&pdf, b"/Type /Catalog"));
    assert!(contains_bytes(&pdf, b"/Count 1"));
    assert!(contains_bytes(&pdf, b"/MediaBox [0 0 595.2756 841.8898]"));
    assert!(contains_bytes(&pdf, b"/BaseFont /Helvetica /Encoding /WinAnsiEncoding"));
    assert!(contains_bytes(&pdf, b"/Title (Invoice 0000012)"));

    assert!(contains_bytes(&pdf, b"(Chaudhary Mobile Shop) Tj"));
    assert!(contains_bytes(&pdf, b"(Asha \\(Shop 4\\)) Tj"));
    assert!(contains_bytes(&pdf, b"(\x95 Fast Charger) Tj"));
    // Footer strip color.
    assert!(contains_bytes(&pdf, b"0.8784 0.7647 0.4157 rg"));
}

#[test]
fn xref_points_at_each_object() {
    let doc = layout_with_logo(&sample_record(), PageSize::A4, None).unwrap();
    let pdf = PdfRenderer::new(false).render(&doc).unwrap();
    for obj in 1..=6 {
        let offset = xref_offset(&pdf, obj);
        let expected = format!("{obj} 0 obj");
        assert!(pdf[offset..].starts_with(expected.as_bytes()), "object {obj}");
    }
}

#[test]
fn compressed_content_inflates_to_operators() {
    let doc = layout_with_logo(&sample_record(), PageSize::A4, None).unwrap();
    let compressed = PdfRenderer::default().render(&doc).unwrap();
    let plain = PdfRenderer::new(false).render(&doc).unwrap();
    assert!(compressed.len() < plain.len());
    assert!(contains_bytes(&compressed, b"/Filter /FlateDecode"));

    let offset = xref_offset(&compressed, 6);
    let body = &compressed[offset..];
    let start = body.windows(7).position(|w| w == b"stream\n").unwrap() + 7;
    let end = body.windows(10).position(|w| w == b"\nendstream").unwrap();
    let mut inflated = Vec::new();
    ZlibDecoder::new(&body[start..end])
        .read_to_end(&mut inflated)
        .unwrap();
    assert!(contains_bytes(&inflated, b"(Chaudhary Mobile Shop) Tj"));
}

#[test]
fn logo_is_embedded_with_soft_mask() {
    let logo = load_image(rgba_logo()).unwrap();
    let doc = layout_with_logo(&sample_record(), PageSize::A4, Some(logo)).unwrap();
    let pdf = PdfRenderer::new(false).render(&doc).unwrap();

    assert!(contains_bytes(&pdf, b"/Subtype /Image /Width 2 /Height 2 /ColorSpace /DeviceRGB"));
    assert!(contains_bytes(&pdf, b"/ColorSpace /DeviceGray"));
    assert!(contains_bytes(&pdf, b"/SMask "));
    assert!(contains_bytes(&pdf, b"/XObject << /Im0 "));
    assert!(contains_bytes(&pdf, b"60 0 0 60 40 751.8898 cm\n/Im0 Do"));
}
