//! PROV-XML: element tree, reader and writer.

pub mod read;
pub mod tree;
pub mod write;

pub use read::read_xml;
pub use tree::XmlElement;
pub use write::write_xml;
