// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Incremental update that adds an invisible signature field to a PDF.
//
// The original bytes are kept verbatim. Appended after them:
//
//   n+0  signature dictionary   /Type /Sig, /ByteRange and /Contents placeholders
//   n+1  widget annotation      /FT /Sig, zero-size /Rect, on the first page
//   n+2  AcroForm               /Fields [n+1] /SigFlags 3
//   catalog                     re-written with /AcroForm
//   first page                  re-written with the widget appended to /Annots
//
// followed by a classic xref section and a trailer whose /Prev points at the
// previous cross-reference section.

use std::io::Write;

use chrono::{DateTime, Utc};
use docseal_core::error::{DocsealError, Result};
use docseal_document::PdfReader;
use lopdf::{Dictionary, Object, ObjectId, text_string};
use tracing::debug;

use super::byterange::{BYTE_RANGE_WIDTH, ByteRange, ContentsPlaceholder};
use super::syntax::{name, write_dictionary, write_name, write_object};
use crate::signer::SignOptions;

/// Widget annotation flags: Print (4) + Locked (128).
const WIDGET_FLAGS: i64 = 132;

/// AcroForm /SigFlags: SignaturesExist (1) + AppendOnly (2).
const SIG_FLAGS: i64 = 3;

/// A PDF with the update appended and the signature slot still empty.
#[derive(Debug)]
pub struct PreparedUpdate {
    pub bytes: Vec<u8>,
    /// Offset of the `<` opening the `/Contents` placeholder.
    pub contents_offset: usize,
    pub placeholder: ContentsPlaceholder,
    /// Already written into the signature dictionary.
    pub byte_range: ByteRange,
}

/// Append the signature field objects to `original`.
pub fn prepare(
    original: &[u8],
    options: &SignOptions,
    signed_at: DateTime<Utc>,
) -> Result<PreparedUpdate> {
    let reader = PdfReader::from_bytes(original).map_err(input_error)?;
    let prev_xref = find_startxref(original)?;

    let catalog_id = reader.catalog_id().map_err(input_error)?;
    let page_id = reader.page_id(1).map_err(input_error)?;

    let next = reader.next_object_number();
    let sig_id: ObjectId = (next, 0);
    let widget_id: ObjectId = (next + 1, 0);
    let form_id: ObjectId = (next + 2, 0);

    let mut catalog = reader.dictionary(catalog_id).map_err(input_error)?.clone();
    catalog.set("AcroForm", Object::Reference(form_id));

    let mut page = reader.dictionary(page_id).map_err(input_error)?.clone();
    let mut annotations = existing_annotations(&reader, &page)?;
    annotations.push(Object::Reference(widget_id));
    page.set("Annots", Object::Array(annotations));

    let placeholder = ContentsPlaceholder::new(options.signature_capacity);

    let mut out = original.to_vec();
    if !out.ends_with(b"\n") {
        out.push(b'\n');
    }
    let mut offsets: Vec<(ObjectId, usize)> = Vec::with_capacity(5);

    // Signature dictionary, written by hand to know where the placeholders land.
    offsets.push((sig_id, out.len()));
    let _ = writeln!(out, "{} {} obj", sig_id.0, sig_id.1);
    out.extend_from_slice(
        b"<< /Type /Sig /Filter /Adobe.PPKLite /SubFilter /adbe.pkcs7.detached /ByteRange ",
    );
    let byte_range_offset = out.len();
    out.extend_from_slice(ByteRange::placeholder().as_bytes());
    out.extend_from_slice(b" /Contents ");
    let contents_offset = out.len();
    out.extend_from_slice(placeholder.text().as_bytes());
    for (key, value) in signature_metadata(options, signed_at).iter() {
        out.push(b' ');
        write_name(&mut out, key);
        out.push(b' ');
        write_object(&mut out, value);
    }
    out.extend_from_slice(b" >>\nendobj\n");

    let mut widget = Dictionary::new();
    widget.set("Type", name("Annot"));
    widget.set("Subtype", name("Widget"));
    widget.set("FT", name("Sig"));
    widget.set("T", text_string(&options.field_name));
    widget.set("V", Object::Reference(sig_id));
    widget.set("F", Object::Integer(WIDGET_FLAGS));
    widget.set("Rect", Object::Array(vec![Object::Integer(0); 4]));
    widget.set("P", Object::Reference(page_id));
    push_object(&mut out, &mut offsets, widget_id, &widget);

    let mut form = Dictionary::new();
    form.set("Fields", Object::Array(vec![Object::Reference(widget_id)]));
    form.set("SigFlags", Object::Integer(SIG_FLAGS));
    push_object(&mut out, &mut offsets, form_id, &form);

    push_object(&mut out, &mut offsets, catalog_id, &catalog);
    push_object(&mut out, &mut offsets, page_id, &page);

    let xref_offset = out.len();
    offsets.sort_unstable_by_key(|(id, _)| *id);
    out.extend_from_slice(b"xref\n");
    for ((number, generation), offset) in &offsets {
        let _ = write!(out, "{number} 1\n{offset:010} {generation:05} n \n");
    }

    let mut trailer = Dictionary::new();
    trailer.set("Size", Object::Integer(i64::from(next + 3)));
    trailer.set("Root", Object::Reference(catalog_id));
    for key in [b"Info".as_slice(), b"ID".as_slice()] {
        if let Ok(value) = reader.trailer().get(key) {
            trailer.set(key.to_vec(), value.clone());
        }
    }
    trailer.set("Prev", Object::Integer(prev_xref as i64));
    out.extend_from_slice(b"trailer\n");
    write_dictionary(&mut out, &trailer);
    let _ = write!(out, "\nstartxref\n{xref_offset}\n%%EOF\n");

    let byte_range = ByteRange::around(contents_offset, placeholder.len(), out.len());
    let padded = byte_range.to_padded()?;
    out[byte_range_offset..byte_range_offset + BYTE_RANGE_WIDTH].copy_from_slice(padded.as_bytes());

    debug!(
        appended = out.len() - original.len(),
        first_new_object = next,
        prev_xref,
        "incremental update prepared"
    );

    Ok(PreparedUpdate {
        bytes: out,
        contents_offset,
        placeholder,
        byte_range,
    })
}

fn signature_metadata(options: &SignOptions, signed_at: DateTime<Utc>) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("M", text_string(&pdf_date(signed_at)));
    let optional = [
        ("Name", &options.signer_name),
        ("Reason", &options.reason),
        ("Location", &options.location),
        ("ContactInfo", &options.contact_info),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            dict.set(key, text_string(value));
        }
    }
    dict
}

/// PDF date string, always in UTC.
pub fn pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

fn push_object(
    out: &mut Vec<u8>,
    offsets: &mut Vec<(ObjectId, usize)>,
    id: ObjectId,
    dict: &Dictionary,
) {
    offsets.push((id, out.len()));
    let _ = writeln!(out, "{} {} obj", id.0, id.1);
    write_dictionary(out, dict);
    out.extend_from_slice(b"\nendobj\n");
}

fn existing_annotations(reader: &PdfReader, page: &Dictionary) -> Result<Vec<Object>> {
    match page.get(b"Annots") {
        Err(_) => Ok(Vec::new()),
        Ok(value) => match reader.resolve(value).map_err(input_error)? {
            Object::Array(items) => Ok(items.clone()),
            _ => Err(DocsealError::SigningFailed(
                "input PDF: page /Annots is not an array".into(),
            )),
        },
    }
}

/// Byte offset recorded after the last `startxref` keyword.
fn find_startxref(pdf: &[u8]) -> Result<usize> {
    const KEYWORD: &[u8] = b"startxref";
    let missing = || DocsealError::SigningFailed("input PDF: no startxref".into());

    let at = pdf
        .windows(KEYWORD.len())
        .rposition(|window| window == KEYWORD)
        .ok_or_else(missing)?;
    let digits: String = pdf[at + KEYWORD.len()..]
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| char::from(b))
        .collect();
    digits.parse().map_err(|_| missing())
}

/// Structural problems in the input are signing failures at this stage.
fn input_error(err: DocsealError) -> DocsealError {
    match err {
        DocsealError::MalformedPdf(detail) => {
            DocsealError::SigningFailed(format!("input PDF: {detail}"))
        }
        other => other,
    }
}
