//! XML probing and decoding into an element-tree mapping.
//!
//! The document becomes `{root_name: value}` where an element's value is:
//! - `null` when it has no attributes, children or text
//! - its text when it only has text
//! - otherwise an object with attributes under `@name`, children under their tag name
//!   (repeated tags collapse into an array) and text under `#text`

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value as JsonValue};

use crate::error::{DecodeError, DecodeResult};
use crate::resource::ResourceDescriptor;
use crate::types::Representation;

const ATTRIBUTE_PREFIX: &str = "@";
const TEXT_KEY: &str = "#text";

/// Admissible iff the first non-whitespace character is `<` and the text is well formed.
///
/// The delimiter check runs first: some non-markup text parses cleanly as a document with no
/// elements, which must not count as XML.
pub fn probe_xml(resource: &ResourceDescriptor) -> DecodeResult<()> {
    let text = resource.text().ok_or(DecodeError::NotText)?;
    if !text.trim_start().starts_with('<') {
        return Err(markup_error("content does not start with '<'"));
    }
    xml_to_mapping(text).map(|_| ())
}

/// Decode into [`Representation::Mapping`].
pub fn decode_xml_mapping(resource: &mut ResourceDescriptor) -> DecodeResult<Representation> {
    let text = resource.text().ok_or(DecodeError::NotText)?;
    xml_to_mapping(text).map(Representation::Mapping)
}

/// Parse a complete XML document into its element-tree mapping.
pub fn xml_to_mapping(input: &str) -> DecodeResult<Map<String, JsonValue>> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<(String, JsonValue)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => {
                if root.is_some() {
                    return Err(markup_error("multiple root elements"));
                }
                stack.push(XmlElement::open(&tag)?);
            }
            Ok(Event::Empty(tag)) => {
                if root.is_some() {
                    return Err(markup_error("multiple root elements"));
                }
                let element = XmlElement::open(&tag)?;
                close_element(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| markup_error("closing tag without matching opening tag"))?;
                close_element(&mut stack, &mut root, element);
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| markup_error(e.to_string()))?;
                append_text(&mut stack, &text)?;
            }
            Ok(Event::CData(data)) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                append_text(&mut stack, &text)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(markup_error(format!(
                    "at position {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(markup_error(format!("unclosed element <{}>", open.name)));
    }
    let (name, value) = root.ok_or_else(|| markup_error("document has no root element"))?;

    let mut map = Map::new();
    map.insert(name, value);
    Ok(map)
}

#[derive(Debug)]
struct XmlElement {
    name: String,
    fields: Map<String, JsonValue>,
    has_structure: bool,
    text: String,
}

impl XmlElement {
    fn open(tag: &BytesStart<'_>) -> DecodeResult<Self> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
        let mut fields = Map::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(|e| markup_error(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref());
            let value = attr
                .unescape_value()
                .map_err(|e| markup_error(e.to_string()))?;
            fields.insert(
                format!("{ATTRIBUTE_PREFIX}{key}"),
                JsonValue::String(value.into_owned()),
            );
        }
        let has_structure = !fields.is_empty();
        Ok(Self {
            name,
            fields,
            has_structure,
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, value: JsonValue) {
        self.has_structure = true;
        match self.fields.get_mut(&name) {
            Some(JsonValue::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = JsonValue::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }

    fn into_value(self) -> JsonValue {
        let text = self.text.trim();
        if !self.has_structure {
            return if text.is_empty() {
                JsonValue::Null
            } else {
                JsonValue::String(text.to_string())
            };
        }
        let mut fields = self.fields;
        if !text.is_empty() {
            fields.insert(TEXT_KEY.to_string(), JsonValue::String(text.to_string()));
        }
        JsonValue::Object(fields)
    }
}

fn close_element(
    stack: &mut [XmlElement],
    root: &mut Option<(String, JsonValue)>,
    mut element: XmlElement,
) {
    let name = std::mem::take(&mut element.name);
    let value = element.into_value();
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None => *root = Some((name, value)),
    }
}

fn append_text(stack: &mut [XmlElement], text: &str) -> DecodeResult<()> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(markup_error("text outside the root element")),
    }
}

fn markup_error(message: impl Into<String>) -> DecodeError {
    DecodeError::Markup {
        message: message.into(),
    }
}
