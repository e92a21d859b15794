//! Serializes a [`super::PdfGraph`] back to PDF bytes.
//!
//! Follows the same object/xref/trailer emission conventions as a
//! generation-time writer (`write_object_value`, `write_xref`,
//! `write_trailer`), but walks an arbitrary parsed
//! `parser::objects::PdfObject` graph instead of a from-scratch builder
//! model: this crate edits an existing document rather than generating one,
//! so every object number not touched by recoloring must round-trip
//! unchanged, and the writer always regenerates a classic
//! (non-cross-reference-stream) `xref`/`trailer` regardless of what the
//! source file used.

use std::collections::HashMap;

use crate::error::{PdfNoirError, Result};
use crate::parser::objects::{PdfArray, PdfDictionary, PdfName, PdfObject, PdfStream, PdfString};

use super::PdfGraph;

pub struct GraphWriter {
    out: Vec<u8>,
    offsets: HashMap<(u32, u16), u64>,
}

impl GraphWriter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            offsets: HashMap::new(),
        }
    }

    /// Serialize `graph` to a complete PDF byte buffer.
    pub fn write(graph: &PdfGraph) -> Result<Vec<u8>> {
        let mut writer = GraphWriter::new();
        writer.write_header();

        let mut obj_refs: Vec<(u32, u16)> = graph.objects().keys().copied().collect();
        obj_refs.sort_unstable();

        for obj_ref in &obj_refs {
            let obj = &graph.objects()[obj_ref];
            writer.write_object(*obj_ref, obj)?;
        }

        let xref_offset = writer.out.len() as u64;
        writer.write_xref(&obj_refs);
        writer.write_trailer(graph.trailer(), xref_offset, &obj_refs);

        Ok(writer.out)
    }

    fn write_header(&mut self) {
        self.push(b"%PDF-1.7\n");
        self.push(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);
    }

    fn write_object(&mut self, obj_ref: (u32, u16), obj: &PdfObject) -> Result<()> {
        self.offsets.insert(obj_ref, self.out.len() as u64);
        let header = format!("{} {} obj\n", obj_ref.0, obj_ref.1);
        self.push(header.as_bytes());
        self.write_value(obj)?;
        self.push(b"\nendobj\n");
        Ok(())
    }

    fn write_value(&mut self, obj: &PdfObject) -> Result<()> {
        match obj {
            PdfObject::Null => self.push(b"null"),
            PdfObject::Boolean(b) => self.push(if *b { b"true" } else { b"false" }),
            PdfObject::Integer(i) => self.push(i.to_string().as_bytes()),
            PdfObject::Real(f) => self.push(format_real(*f).as_bytes()),
            PdfObject::String(s) => self.write_string(s),
            PdfObject::Name(n) => self.write_name(n),
            PdfObject::Array(arr) => self.write_array(arr)?,
            PdfObject::Dictionary(dict) => self.write_dictionary(dict)?,
            PdfObject::Stream(stream) => self.write_stream(stream)?,
            PdfObject::Reference(n, g) => self.push(format!("{n} {g} R").as_bytes()),
        }
        Ok(())
    }

    fn write_string(&mut self, s: &PdfString) {
        self.push(b"(");
        for &byte in &s.0 {
            if byte == b'(' || byte == b')' || byte == b'\\' {
                self.push(&[b'\\', byte]);
            } else {
                self.push(&[byte]);
            }
        }
        self.push(b")");
    }

    fn write_name(&mut self, name: &PdfName) {
        self.push(b"/");
        self.push(name.0.as_bytes());
    }

    fn write_array(&mut self, arr: &PdfArray) -> Result<()> {
        self.push(b"[");
        for (i, item) in arr.0.iter().enumerate() {
            if i > 0 {
                self.push(b" ");
            }
            self.write_value(item)?;
        }
        self.push(b"]");
        Ok(())
    }

    fn write_dictionary(&mut self, dict: &PdfDictionary) -> Result<()> {
        self.push(b"<<");
        for (key, value) in dict.0.iter() {
            self.push(b"\n/");
            self.push(key.0.as_bytes());
            self.push(b" ");
            self.write_value(value)?;
        }
        self.push(b"\n>>");
        Ok(())
    }

    fn write_stream(&mut self, stream: &PdfStream) -> Result<()> {
        self.write_dictionary(&stream.dict)?;
        self.push(b"\nstream\n");
        self.push(&stream.data);
        self.push(b"\nendstream");
        Ok(())
    }

    fn write_xref(&mut self, obj_refs: &[(u32, u16)]) {
        self.push(b"xref\n");
        let max_obj_num = obj_refs.iter().map(|(n, _)| *n).max().unwrap_or(0);

        self.push(format!("0 {}\n", max_obj_num + 1).as_bytes());
        self.push(b"0000000000 65535 f \n");

        for obj_num in 1..=max_obj_num {
            match obj_refs
                .iter()
                .find(|(n, _)| *n == obj_num)
                .and_then(|obj_ref| self.offsets.get(obj_ref).map(|&off| (off, obj_ref.1)))
            {
                Some((offset, gen)) => {
                    self.push(format!("{offset:010} {gen:05} n \n").as_bytes());
                }
                None => self.push(b"0000000000 00000 f \n"),
            }
        }
    }

    fn write_trailer(&mut self, trailer: &PdfDictionary, xref_offset: u64, obj_refs: &[(u32, u16)]) {
        let max_obj_num = obj_refs.iter().map(|(n, _)| *n).max().unwrap_or(0);

        let mut out_trailer = PdfDictionary::new();
        out_trailer.insert("Size".to_string(), PdfObject::Integer(max_obj_num as i64 + 1));
        if let Some(root) = trailer.get("Root") {
            out_trailer.insert("Root".to_string(), root.clone());
        }
        if let Some(info) = trailer.get("Info") {
            out_trailer.insert("Info".to_string(), info.clone());
        }
        if let Some(id) = trailer.get("ID") {
            out_trailer.insert("ID".to_string(), id.clone());
        }

        self.push(b"trailer\n");
        let _ = self.write_value(&PdfObject::Dictionary(out_trailer));
        self.push(b"\nstartxref\n");
        self.push(xref_offset.to_string().as_bytes());
        self.push(b"\n%%EOF\n");
    }

    fn push(&mut self, data: &[u8]) {
        self.out.extend_from_slice(data);
    }
}

impl Default for GraphWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_real(v: f64) -> String {
    let mut s = format!("{v:.6}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

/// A trailer is required to have a `Root` entry; a missing one means the
/// source graph never had a valid trailer to begin with.
pub fn require_root(trailer: &PdfDictionary) -> Result<(u32, u16)> {
    trailer
        .get("Root")
        .and_then(|o| o.as_reference())
        .ok_or_else(|| PdfNoirError::Serialize("trailer is missing /Root".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PdfGraph;

    fn minimal_pdf() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.7\n");
        let objects: &[&[u8]] = &[
            b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n",
            b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n",
            b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 200] /Contents 4 0 R /Resources << >> >>\nendobj\n",
            b"4 0 obj\n<< /Length 23 >>\nstream\n1 0 0 rg 0 0 10 10 re f\nendstream\nendobj\n",
        ];
        let mut offsets = Vec::new();
        for obj in objects {
            offsets.push(buf.len());
            buf.extend_from_slice(obj);
        }
        let xref_offset = buf.len();
        buf.extend_from_slice(b"xref\n0 5\n0000000000 65535 f \n");
        for off in &offsets {
            buf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
        }
        buf.extend_from_slice(b"trailer\n<< /Size 5 /Root 1 0 R >>\n");
        buf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF").as_bytes());
        buf
    }

    #[test]
    fn round_trip_preserves_object_count_and_trailer_root() {
        let graph = PdfGraph::load(&minimal_pdf()).unwrap();
        let out = GraphWriter::write(&graph).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.starts_with("%PDF-1.7"));
        assert!(text.contains("/Root 1 0 R"));
        assert!(text.contains("startxref"));
        assert!(text.ends_with("%%EOF\n"));
    }

    #[test]
    fn require_root_fails_on_trailer_without_root() {
        let trailer = PdfDictionary::new();
        assert!(require_root(&trailer).is_err());
    }
}
