//! XML rendering of decoded trees for inspection.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{Error, Node, NodeList, Result};

/// Name of the element wrapping a rendered list.
const ROOT_ELEMENT: &str = "docnodes";

/// Name of the element carrying an attribute whose name is not a valid XML name.
const ATTRIBUTE_ELEMENT: &str = "attribute";

impl NodeList<'_> {
    /// Render the list as an indented XML document.
    ///
    /// Each node becomes an element named after its type (`TYPE_<raw>` for
    /// tags outside the known set). Attribute bytes and data are decoded as
    /// lossy UTF-8; data becomes the element's text.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut output = Vec::new();
        self.write_xml(&mut output)?;
        String::from_utf8(output).map_err(|e| Error::Xml(e.to_string()))
    }

    /// Write the XML rendering to a writer.
    pub fn write_xml<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);

        xml_writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Xml(e.to_string()))?;

        if self.is_empty() {
            return xml_writer
                .write_event(Event::Empty(BytesStart::new(ROOT_ELEMENT)))
                .map_err(|e| Error::Xml(e.to_string()));
        }

        xml_writer
            .write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))
            .map_err(|e| Error::Xml(e.to_string()))?;
        for node in self {
            write_element(&mut xml_writer, node)?;
        }
        xml_writer
            .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
            .map_err(|e| Error::Xml(e.to_string()))?;

        Ok(())
    }
}

/// Element name for a node.
fn element_name(node: &Node<'_>) -> String {
    match node.node_type().name() {
        Some(name) => name.to_string(),
        None => format!("TYPE_{}", node.node_type().raw()),
    }
}

/// Whether `name` can be written on a start tag as-is.
///
/// ASCII subset of the XML `Name` production: a letter, `_` or `:`
/// followed by letters, digits, `-`, `.`, `_` or `:`.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
}

/// Write a single element and its children.
///
/// Attributes with names that are not XML names are written as
/// `<attribute index=".." name=".." value=".."/>` children, with both
/// strings escaped as attribute values.
fn write_element<W: Write>(writer: &mut Writer<W>, node: &Node<'_>) -> Result<()> {
    let name = element_name(node);

    let mut elem = BytesStart::new(name.as_str());
    let mut unnamed = Vec::new();
    for (index, attr) in node.attributes().iter().enumerate() {
        let key = attr.name_lossy();
        let value = attr.value_lossy();
        if is_xml_name(&key) {
            elem.push_attribute((&*key, &*value));
        } else {
            unnamed.push((index, key, value));
        }
    }

    if node.data().is_empty() && !node.has_children() && unnamed.is_empty() {
        return writer
            .write_event(Event::Empty(elem))
            .map_err(|e| Error::Xml(e.to_string()));
    }

    writer
        .write_event(Event::Start(elem))
        .map_err(|e| Error::Xml(e.to_string()))?;

    for (index, key, value) in &unnamed {
        let index = index.to_string();
        let mut attr_elem = BytesStart::new(ATTRIBUTE_ELEMENT);
        attr_elem.push_attribute(("index", index.as_str()));
        attr_elem.push_attribute(("name", &**key));
        attr_elem.push_attribute(("value", &**value));
        writer
            .write_event(Event::Empty(attr_elem))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }

    if !node.data().is_empty() {
        let text = String::from_utf8_lossy(node.data());
        writer
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }

    for child in node.children() {
        write_element(writer, child)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(|e| Error::Xml(e.to_string()))?;

    Ok(())
}
