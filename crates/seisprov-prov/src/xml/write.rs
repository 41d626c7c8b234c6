//! PROV-XML writer.
//!
//! Used to feed PROV-JSON sources through the PROV-XML structure check.
//! Children are written in PROV-XML order: formal attributes, then
//! `prov:label`, `prov:location`, `prov:role`, `prov:type`, `prov:value`,
//! then attributes from other namespaces.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use seisprov_core::{
    AttributeValue, Namespace, NamespaceScope, ProvDocument, QualifiedName, Record, PROV_NS_URI,
    XSD_NS_URI, XSI_NS_URI,
};

use crate::error::WriteError;
use crate::vocab;

type XmlWriter = Writer<Vec<u8>>;

/// Serialize a document to indented PROV-XML.
///
/// # Errors
///
/// Returns [`WriteError`] if the XML writer fails.
pub fn write_xml(document: &ProvDocument) -> Result<String, WriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("prov:document");
    root.push_attribute(("xmlns:prov", PROV_NS_URI));
    root.push_attribute(("xmlns:xsd", XSD_NS_URI));
    root.push_attribute(("xmlns:xsi", XSI_NS_URI));
    for ns in document.root().namespaces().iter() {
        push_declaration(&mut root, ns);
    }
    writer.write_event(Event::Start(root))?;

    for record in document.root().records() {
        write_record(&mut writer, record)?;
    }

    for bundle in document.bundles() {
        let mut start = BytesStart::new("prov:bundleContent");
        for ns in own_declarations(document.root().namespaces(), bundle.namespaces()) {
            push_declaration(&mut start, ns);
        }
        let id = bundle.identifier().map(ToString::to_string);
        if let Some(id) = &id {
            start.push_attribute(("prov:id", id.as_str()));
        }
        writer.write_event(Event::Start(start))?;
        for record in bundle.records() {
            write_record(&mut writer, record)?;
        }
        writer.write_event(Event::End(BytesEnd::new("prov:bundleContent")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("prov:document")))?;
    String::from_utf8(writer.into_inner()).map_err(|_| WriteError::Encoding)
}

/// Bindings of `child` that `parent` does not already have.
fn own_declarations<'a>(
    parent: &'a NamespaceScope,
    child: &'a NamespaceScope,
) -> impl Iterator<Item = &'a Namespace> + 'a {
    child.iter().filter(move |ns| {
        parent
            .resolve_prefix(ns.prefix())
            .map_or(true, |existing| existing.uri() != ns.uri())
    })
}

fn push_declaration(start: &mut BytesStart<'_>, ns: &Namespace) {
    match ns.prefix() {
        "prov" | "xsd" | "xsi" => {}
        "" => start.push_attribute(("xmlns", ns.uri())),
        prefix => {
            let key = format!("xmlns:{prefix}");
            start.push_attribute((key.as_str(), ns.uri()));
        }
    }
}

fn write_record(writer: &mut XmlWriter, record: &Record) -> Result<(), WriteError> {
    let name = format!("prov:{}", record.kind().element_name());
    let mut start = BytesStart::new(name.as_str());
    let id = record.identifier().map(ToString::to_string);
    if let Some(id) = &id {
        start.push_attribute(("prov:id", id.as_str()));
    }

    let formal = record.formal_attributes();
    let mut extra: Vec<&(QualifiedName, AttributeValue)> =
        record.extra_attributes().iter().collect();
    extra.sort_by_key(|(key, _)| child_rank(key));

    if formal.is_empty() && extra.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;

    for (key, value) in formal {
        let tag = format!("prov:{}", key.local_part());
        let is_time = vocab::is_time_attribute(key.local_part());
        match value {
            AttributeValue::QualifiedName(target) if !is_time => {
                let target = target.to_string();
                let mut reference = BytesStart::new(tag.as_str());
                reference.push_attribute(("prov:ref", target.as_str()));
                writer.write_event(Event::Empty(reference))?;
            }
            other => write_text_element(writer, &tag, None, &other.text())?,
        }
    }
    for (key, value) in extra {
        write_text_element(writer, &key.to_string(), value.datatype().as_deref(), &value.text())?;
    }

    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

fn write_text_element(
    writer: &mut XmlWriter,
    tag: &str,
    datatype: Option<&str>,
    text: &str,
) -> Result<(), WriteError> {
    let mut start = BytesStart::new(tag);
    if let Some(datatype) = datatype {
        start.push_attribute(("xsi:type", datatype));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn child_rank(key: &QualifiedName) -> usize {
    if !key.is_in(PROV_NS_URI) {
        return vocab::PROV_VALUE_ATTRIBUTES.len() + 1;
    }
    vocab::PROV_VALUE_ATTRIBUTES
        .iter()
        .position(|local| *local == key.local_part())
        .unwrap_or(vocab::PROV_VALUE_ATTRIBUTES.len())
}
