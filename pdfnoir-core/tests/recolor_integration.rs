//! Integration tests covering invariants 1-3, 8, 9: page count, page
//! dimensions, extractable text, operator arity, and graphics-state
//! balance are all preserved across `process()`.
//!
//! Fixtures are hand-built PDF byte literals, in the same style as the
//! parser's own round-trip tests, rather than loaded from disk.

use std::io::Cursor;

use pdfnoir_core::content::{tokenize, TokenKind};
use pdfnoir_core::parser::document::PdfDocument;
use pdfnoir_core::parser::reader::PdfReader;

/// A two-page PDF: page 1 draws black text, page 2 has a balanced
/// `q`/`Q` pair with a color fill inside it.
fn two_page_pdf() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.7\n");
    let objects: &[&[u8]] = &[
        b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n",
        b"2 0 obj\n<< /Type /Pages /Kids [3 0 R 5 0 R] /Count 2 >>\nendobj\n",
        b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 300] /Contents 4 0 R /Resources << >> >>\nendobj\n",
        b"4 0 obj\n<< /Length 29 >>\nstream\n0 0 0 rg 72 200 Td (Hello) Tj\nendstream\nendobj\n",
        b"5 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 400 500] /Contents 6 0 R /Resources << >> >>\nendobj\n",
        b"6 0 obj\n<< /Length 53 >>\nstream\nq 1 0 0 rg 0 0 10 10 re f Q q 0 0 0 rg 5 5 2 2 re f Q\nendstream\nendobj\n",
    ];
    let mut offsets = Vec::new();
    for obj in objects {
        offsets.push(buf.len());
        buf.extend_from_slice(obj);
    }
    let xref_offset = buf.len();
    buf.extend_from_slice(b"xref\n0 7\n0000000000 65535 f \n");
    for off in &offsets {
        buf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    buf.extend_from_slice(b"trailer\n<< /Size 7 /Root 1 0 R >>\n");
    buf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF").as_bytes());
    buf
}

/// A single-page PDF whose content stream contains an inline image
/// sandwiched between black text draws, for scenario 6 of the testable
/// properties table (inline image bytes preserved verbatim).
fn inline_image_pdf() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.7\n");
    let content: &[u8] =
        b"0 0 0 rg (X) Tj BI /W 2 /H 2 /BPC 8 /CS /RGB ID \xff\x00\xff\x00 EI 0 0 0 rg (Y) Tj";
    let mut stream_obj = Vec::new();
    stream_obj.extend_from_slice(format!("4 0 obj\n<< /Length {} >>\nstream\n", content.len()).as_bytes());
    stream_obj.extend_from_slice(content);
    stream_obj.extend_from_slice(b"\nendstream\nendobj\n");

    let objects: Vec<Vec<u8>> = vec![
        b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n".to_vec(),
        b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n".to_vec(),
        b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 200] /Contents 4 0 R /Resources << >> >>\nendobj\n".to_vec(),
        stream_obj,
    ];
    let mut offsets = Vec::new();
    for obj in &objects {
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

fn parse_document(bytes: &[u8]) -> PdfDocument<Cursor<Vec<u8>>> {
    let reader = PdfReader::new(Cursor::new(bytes.to_vec())).expect("reader should parse output");
    PdfDocument::new(reader)
}

#[test]
fn page_count_is_preserved() {
    let input = two_page_pdf();
    let output = pdfnoir_core::process(&input, "classic").unwrap();

    let before = parse_document(&input).page_count().unwrap();
    let after = parse_document(&output).page_count().unwrap();
    assert_eq!(before, after);
    assert_eq!(after, 2);
}

#[test]
fn page_dimensions_are_preserved() {
    let input = two_page_pdf();
    let output = pdfnoir_core::process(&input, "midnight").unwrap();

    let before_doc = parse_document(&input);
    let after_doc = parse_document(&output);

    for i in 0..before_doc.page_count().unwrap() {
        let before_page = before_doc.get_page(i).unwrap();
        let after_page = after_doc.get_page(i).unwrap();
        assert_eq!(before_page.media_box, after_page.media_box);
    }
}

#[test]
fn extractable_text_is_preserved() {
    let input = two_page_pdf();
    let output = pdfnoir_core::process(&input, "sepia").unwrap();

    let doc = parse_document(&output);
    let page = doc.get_page(0).unwrap();
    let content_streams = doc.get_page_content_streams(&page).unwrap();
    let joined: Vec<u8> = content_streams.concat();
    let tokens = tokenize(&joined).unwrap();

    let has_hello_string = tokens.iter().any(|t| {
        t.kind == TokenKind::String && String::from_utf8_lossy(t.raw).contains("Hello")
    });
    assert!(has_hello_string, "literal string operand should survive recoloring");
}

#[test]
fn color_operator_arity_is_conserved() {
    let input = two_page_pdf();
    let output = pdfnoir_core::process(&input, "claude").unwrap();

    let doc = parse_document(&output);
    let page = doc.get_page(1).unwrap();
    let streams = doc.get_page_content_streams(&page).unwrap();
    let joined: Vec<u8> = streams.concat();
    let tokens = tokenize(&joined).unwrap();

    let significant: Vec<_> = tokens.iter().filter(|t| !t.is_insignificant()).collect();
    for (i, tok) in significant.iter().enumerate() {
        if tok.is_operator("rg") {
            let operands = significant[..i]
                .iter()
                .rev()
                .take_while(|t| t.as_number().is_some())
                .count();
            assert_eq!(operands, 3, "rg must still take exactly 3 numeric operands");
        }
    }
}

#[test]
fn graphics_state_nesting_stays_balanced() {
    let input = two_page_pdf();
    let output = pdfnoir_core::process(&input, "forest").unwrap();

    let doc = parse_document(&output);
    let page = doc.get_page(1).unwrap();
    let streams = doc.get_page_content_streams(&page).unwrap();
    let joined: Vec<u8> = streams.concat();
    let tokens = tokenize(&joined).unwrap();

    let q_count = tokens.iter().filter(|t| t.is_operator("q")).count();
    let cap_q_count = tokens.iter().filter(|t| t.is_operator("Q")).count();
    assert_eq!(q_count, cap_q_count);
    assert_eq!(q_count, 2, "both q/Q pairs from the input should still be present");
}

#[test]
fn inline_image_bytes_survive_recoloring_byte_for_byte() {
    let input = inline_image_pdf();
    let output = pdfnoir_core::process(&input, "chatgpt").unwrap();

    let doc = parse_document(&output);
    let page = doc.get_page(0).unwrap();
    let streams = doc.get_page_content_streams(&page).unwrap();
    let joined: Vec<u8> = streams.concat();

    let needle: &[u8] = b"ID \xff\x00\xff\x00 EI";
    assert!(
        joined.windows(needle.len()).any(|w| w == needle),
        "inline image payload must round-trip byte-for-byte"
    );
}
