//! XML output.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <response>
//!   <timestamp>2024-03-01T12:30:00.000Z</timestamp>
//!   <count>2</count>
//!   <collection><item>..</item><item>..</item></collection>
//! </response>
//! ```

use std::collections::HashSet;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::serialization::{ResponseEnvelope, SerializeError};

pub const ROOT_ELEMENT: &str = "response";
pub const ITEM_ELEMENT: &str = "item";

pub fn to_string(envelope: &ResponseEnvelope) -> Result<String, SerializeError> {
    let mut writer = Writer::new(Vec::new());

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    emit(&mut writer, Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
    write_members(&mut writer, envelope.entries())?;
    emit(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Sibling members whose names sanitize to the same element get `_2`, `_3`, ...
fn write_members<'a>(
    writer: &mut Writer<Vec<u8>>,
    members: impl IntoIterator<Item = (&'a String, &'a Value)>,
) -> Result<(), SerializeError> {
    let mut used = HashSet::new();
    for (name, value) in members {
        let base = element_name(name);
        let mut element = base.clone();
        let mut n = 1;
        while !used.insert(element.clone()) {
            n += 1;
            element = format!("{base}_{n}");
        }
        write_element(writer, &element, value)?;
    }
    Ok(())
}

/// `name` must already be a legal element name.
fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), SerializeError> {
    match value {
        Value::Null => emit(writer, Event::Empty(BytesStart::new(name))),
        Value::Object(members) if members.is_empty() => emit(writer, Event::Empty(BytesStart::new(name))),
        Value::Array(items) if items.is_empty() => emit(writer, Event::Empty(BytesStart::new(name))),
        Value::Object(members) => {
            emit(writer, Event::Start(BytesStart::new(name)))?;
            write_members(writer, members)?;
            emit(writer, Event::End(BytesEnd::new(name)))
        }
        Value::Array(items) => {
            emit(writer, Event::Start(BytesStart::new(name)))?;
            for item in items {
                write_element(writer, ITEM_ELEMENT, item)?;
            }
            emit(writer, Event::End(BytesEnd::new(name)))
        }
        Value::String(s) => write_text(writer, name, s),
        other => write_text(writer, name, &other.to_string()),
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), SerializeError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SerializeError> {
    writer
        .write_event(event)
        .map_err(|e| SerializeError::Xml(e.to_string()))
}

/// Coerce a member name into a legal XML element name.
pub(crate) fn element_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match out.chars().next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => out.insert(0, '_'),
    }
    out
}
