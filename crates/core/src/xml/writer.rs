use std::borrow::Cow;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::XmlError;

/// Escape `& < > " '` for use in text or attribute values.
pub fn escape_xml(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Streaming builder for small, indented XML documents.
///
/// Every text node and attribute value passes through [`escape_xml`].
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    /// Start a document with a UTF-8 declaration.
    pub fn new() -> Result<Self, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        Ok(Self { writer })
    }

    pub fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<&mut Self, XmlError> {
        self.write(Event::Start(start_tag(name, attributes)))
    }

    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<&mut Self, XmlError> {
        self.write(Event::Empty(start_tag(name, attributes)))
    }

    /// `<name>text</name>`
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, XmlError> {
        self.write(Event::Start(BytesStart::new(name)))?;
        self.write(Event::Text(BytesText::from_escaped(escape_xml(text))))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn close(&mut self, name: &str) -> Result<&mut Self, XmlError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn finish(self) -> String {
        String::from_utf8_lossy(&self.writer.into_inner()).into_owned()
    }

    fn write(&mut self, event: Event<'_>) -> Result<&mut Self, XmlError> {
        self.writer
            .write_event(event)
            .map_err(|e| XmlError::Write(e.to_string()))?;
        Ok(self)
    }
}

fn start_tag<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        let escaped = escape_xml(value);
        // Byte-slice attributes are written as-is; the value is already escaped.
        start.push_attribute(Attribute::from((key.as_bytes(), escaped.as_bytes())));
    }
    start
}
