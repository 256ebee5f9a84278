use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Object identifier: (object_number, generation_number).
/// Generation is always 0 for freshly written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(pub u32, pub u16);

/// The subset of PDF object types the invoice writer emits.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Integer(i64),
    Real(f64),
    /// Name without the leading `/`.
    Name(String),
    /// Literal string bytes, already in the target encoding, unescaped.
    String(Vec<u8>),
    Array(Vec<PdfObject>),
    /// Key-value pairs. A Vec keeps output order deterministic.
    Dictionary(Vec<(String, PdfObject)>),
    /// `/Length` is added by the writer.
    Stream {
        dict: Vec<(String, PdfObject)>,
        data: Vec<u8>,
    },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    /// A text string for metadata such as `/Title`.
    pub fn text(s: &str) -> Self {
        PdfObject::String(crate::fonts::encode_win_ansi(s))
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dictionary(owned_entries(entries))
    }

    pub fn stream(entries: Vec<(&str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream {
            dict: owned_entries(entries),
            data,
        }
    }

    /// A stream whose data is zlib-compressed and tagged `/FlateDecode`.
    pub fn flate_stream(mut entries: Vec<(&str, PdfObject)>, data: &[u8]) -> std::io::Result<Self> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;
        entries.push(("Filter", PdfObject::name("FlateDecode")));
        Ok(PdfObject::stream(entries, compressed))
    }

    /// `[x y w h]` rectangle array.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Real(x),
            PdfObject::Real(y),
            PdfObject::Real(width),
            PdfObject::Real(height),
        ])
    }
}

impl From<ObjId> for PdfObject {
    fn from(id: ObjId) -> Self {
        PdfObject::Reference(id)
    }
}

fn owned_entries(entries: Vec<(&str, PdfObject)>) -> Vec<(String, PdfObject)> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
