use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{FeedError, Result};
use crate::models::{XmlElement, XmlNode};

/// Parse XML text into a generic element tree
///
/// Declarations, comments, processing instructions and doctypes are dropped.
/// Whitespace-only text between elements is dropped; every other text node
/// is kept exactly as written.
pub fn parse_xml(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(element_from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FeedError::Parse(format!("unexpected end tag at byte {}", position)))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| FeedError::Parse(format!("bad text at byte {}: {}", position, err)))?;
                if !text.trim().is_empty() {
                    push_text(&mut stack, XmlNode::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_text(&mut stack, XmlNode::CData(text));
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(FeedError::Parse(format!(
                    "error at byte {}: {}",
                    reader.error_position(),
                    err
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FeedError::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| FeedError::Parse("document has no root element".to_string()))
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|err| FeedError::Parse(format!("bad attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| FeedError::Parse(format!("bad attribute `{}`: {}", key, err)))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_element(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(FeedError::Parse(format!(
            "second root element <{}>",
            element.name
        ))),
    }
}

fn push_text(stack: &mut [XmlElement], node: XmlNode) {
    // Text outside the root element carries no data
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Serialize an element tree with an XML declaration
///
/// `pretty` indents nested elements by two spaces.
pub fn write_xml(root: &XmlElement, pretty: bool) -> std::result::Result<String, String> {
    let mut writer = if pretty {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|err| err.to_string())?;
    write_element(&mut writer, root)?;

    String::from_utf8(writer.into_inner()).map_err(|err| err.to_string())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> std::result::Result<(), String> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|err| err.to_string());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|err| err.to_string())?;
    for child in &element.children {
        match child {
            XmlNode::Element(inner) => write_element(writer, inner)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|err| err.to_string())?,
            // A CDATA section cannot contain its own terminator
            XmlNode::CData(text) if text.contains("]]>") => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|err| err.to_string())?,
            XmlNode::CData(text) => writer
                .write_event(Event::CData(BytesCData::new(text.as_str())))
                .map_err(|err| err.to_string())?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|err| err.to_string())
}
