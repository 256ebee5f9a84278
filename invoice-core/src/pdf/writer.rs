use std::io::{self, Write};

use crate::pdf::objects::{ObjId, PdfObject};

/// Serializes indirect objects to any `Write` target, remembering where
/// each one starts so the cross-reference table can be written last.
pub struct PdfWriter<W: Write> {
    inner: W,
    offset: usize,
    /// Byte offset per object number; index 0 is the free-list head.
    offsets: Vec<Option<usize>>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(inner: W) -> Self {
        PdfWriter {
            inner,
            offset: 0,
            offsets: vec![None],
        }
    }

    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.offset += bytes.len();
        Ok(())
    }

    /// PDF 1.7 header plus a binary-marker comment.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.emit(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n")
    }

    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        let index = id.0 as usize;
        if self.offsets.len() <= index {
            self.offsets.resize(index + 1, None);
        }
        self.offsets[index] = Some(self.offset);

        let mut buf = format!("{} {} obj\n", id.0, id.1).into_bytes();
        serialize(obj, &mut buf);
        buf.extend_from_slice(b"\nendobj\n");
        self.emit(&buf)
    }

    /// Cross-reference table, trailer, `startxref` and `%%EOF`.
    pub fn finish(mut self, root: ObjId, info: Option<ObjId>) -> io::Result<W> {
        let xref_offset = self.offset;
        let size = self.offsets.len();

        let mut buf = format!("xref\n0 {size}\n").into_bytes();
        buf.extend_from_slice(b"0000000000 65535 f\r\n");
        for entry in &self.offsets[1..] {
            match entry {
                Some(off) => buf.extend_from_slice(format!("{off:010} 00000 n\r\n").as_bytes()),
                None => buf.extend_from_slice(b"0000000000 00000 f\r\n"),
            }
        }

        buf.extend_from_slice(
            format!("trailer\n<< /Size {} /Root {} {} R", size, root.0, root.1).as_bytes(),
        );
        if let Some(info) = info {
            buf.extend_from_slice(format!(" /Info {} {} R", info.0, info.1).as_bytes());
        }
        buf.extend_from_slice(format!(" >>\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes());
        self.emit(&buf)?;

        self.inner.flush()?;
        Ok(self.inner)
    }
}

fn serialize(obj: &PdfObject, out: &mut Vec<u8>) {
    match obj {
        PdfObject::Integer(n) => out.extend_from_slice(n.to_string().as_bytes()),
        PdfObject::Real(f) => out.extend_from_slice(format_number(*f).as_bytes()),
        PdfObject::Name(name) => {
            out.push(b'/');
            out.extend_from_slice(name.as_bytes());
        }
        PdfObject::String(bytes) => write_string(bytes, out),
        PdfObject::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                serialize(item, out);
            }
            out.push(b']');
        }
        PdfObject::Dictionary(entries) => {
            write_dict_entries(entries, out);
            out.extend_from_slice(b" >>");
        }
        PdfObject::Stream { dict, data } => {
            write_dict_entries(dict, out);
            out.extend_from_slice(format!(" /Length {} >>\nstream\n", data.len()).as_bytes());
            out.extend_from_slice(data);
            out.extend_from_slice(b"\nendstream");
        }
        PdfObject::Reference(id) => {
            out.extend_from_slice(format!("{} {} R", id.0, id.1).as_bytes());
        }
    }
}

/// Opening `<<` and the entries; the caller closes the dictionary.
fn write_dict_entries(entries: &[(String, PdfObject)], out: &mut Vec<u8>) {
    out.extend_from_slice(b"<<");
    for (key, val) in entries {
        out.extend_from_slice(b" /");
        out.extend_from_slice(key.as_bytes());
        out.push(b' ');
        serialize(val, out);
    }
}

/// Write `bytes` as a parenthesized literal string.
pub fn write_string(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'(');
    for &b in bytes {
        match b {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(b);
            }
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(b),
        }
    }
    out.push(b')');
}

/// Shortest decimal form: integers without a point, otherwise at most four
/// decimals with trailing zeros trimmed. Never scientific notation.
pub fn format_number(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
