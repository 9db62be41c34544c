// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal PDF object serialiser for incremental updates.
//
// lopdf can only write whole documents; an incremental update has to append
// individual objects after the existing bytes without touching them.

use std::io::Write;

use lopdf::{Dictionary, Object, ObjectId, StringFormat};

/// Append the textual form of `object` to `out`.
pub fn write_object(out: &mut Vec<u8>, object: &Object) {
    match object {
        Object::Null => out.extend_from_slice(b"null"),
        Object::Boolean(value) => out.extend_from_slice(if *value { b"true" } else { b"false" }),
        Object::Integer(value) => {
            let _ = write!(out, "{value}");
        }
        Object::Real(value) => {
            let _ = write!(out, "{value}");
        }
        Object::Name(name) => write_name(out, name),
        Object::String(bytes, StringFormat::Literal) => write_literal_string(out, bytes),
        Object::String(bytes, StringFormat::Hexadecimal) => {
            out.push(b'<');
            out.extend_from_slice(hex::encode_upper(bytes).as_bytes());
            out.push(b'>');
        }
        Object::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                write_object(out, item);
            }
            out.push(b']');
        }
        Object::Dictionary(dict) => write_dictionary(out, dict),
        Object::Stream(stream) => {
            let mut dict = stream.dict.clone();
            dict.set("Length", Object::Integer(stream.content.len() as i64));
            write_dictionary(out, &dict);
            out.extend_from_slice(b"\nstream\n");
            out.extend_from_slice(&stream.content);
            out.extend_from_slice(b"\nendstream");
        }
        Object::Reference(id) => write_reference(out, *id),
    }
}

pub fn write_dictionary(out: &mut Vec<u8>, dict: &Dictionary) {
    out.extend_from_slice(b"<<");
    for (key, value) in dict.iter() {
        out.push(b' ');
        write_name(out, key);
        out.push(b' ');
        write_object(out, value);
    }
    out.extend_from_slice(b" >>");
}

pub fn write_reference(out: &mut Vec<u8>, (number, generation): ObjectId) {
    let _ = write!(out, "{number} {generation} R");
}

/// `/Name`, with delimiters and non-printing bytes escaped as `#xx`.
pub fn write_name(out: &mut Vec<u8>, name: &[u8]) {
    out.push(b'/');
    for &byte in name {
        let regular = byte.is_ascii_graphic() && !b"#()<>[]{}/%".contains(&byte);
        if regular {
            out.push(byte);
        } else {
            let _ = write!(out, "#{byte:02X}");
        }
    }
}

/// `(text)`, with the three special characters escaped.
pub fn write_literal_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &byte in bytes {
        match byte {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(byte);
            }
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(byte),
        }
    }
    out.push(b')');
}

pub fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(object: &Object) -> String {
        let mut out = Vec::new();
        write_object(&mut out, object);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(render(&Object::Null), "null");
        assert_eq!(render(&Object::Boolean(true)), "true");
        assert_eq!(render(&Object::Integer(-7)), "-7");
        assert_eq!(render(&Object::Reference((12, 0))), "12 0 R");
    }

    #[test]
    fn names_escape_delimiters() {
        assert_eq!(render(&name("Adobe.PPKLite")), "/Adobe.PPKLite");
        assert_eq!(render(&name("A B")), "/A#20B");
        assert_eq!(render(&name("x/y")), "/x#2Fy");
    }

    #[test]
    fn literal_strings_escape_parentheses() {
        let object = Object::String(b"Hello (World) \\".to_vec(), StringFormat::Literal);
        assert_eq!(render(&object), "(Hello \\(World\\) \\\\)");
    }

    #[test]
    fn dictionaries_keep_insertion_order() {
        let mut dict = Dictionary::new();
        dict.set("Type", name("Annot"));
        dict.set("Rect", Object::Array(vec![Object::Integer(0); 4]));
        dict.set("P", Object::Reference((3, 0)));
        assert_eq!(
            render(&Object::Dictionary(dict)),
            "<< /Type /Annot /Rect [0 0 0 0] /P 3 0 R >>"
        );
    }
}
