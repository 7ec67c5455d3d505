//! SAX-style XML event source.
//!
//! Wraps the `quick-xml` pull reader into the three events the protocol
//! engine consumes: element start (with decoded attributes), character
//! data, and element end. Element and attribute names are lower-cased
//! here so the state machines match on a single spelling.
//!
//! The reader is incremental: it blocks only on the underlying byte
//! stream, and empty elements are expanded to a start/end pair so the
//! engine never sees a separate "empty" event.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};

/// Decoded attributes of a start element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    /// Create an attribute set from name/value pairs.
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Attrs(pairs)
    }

    /// Look up an attribute value by (lower-case) name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up an attribute and clone it.
    pub fn get_owned(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_owned)
    }

    /// Attribute value interpreted as a protocol boolean ("1" is true).
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name) == Some("1")
    }

    /// Iterate over the raw pairs.
    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.0.iter()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One event from the XML stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Element opening tag with decoded attributes.
    Start { name: String, attrs: Attrs },
    /// Character data (may arrive in multiple chunks per element).
    Text(String),
    /// Element closing tag.
    End { name: String },
}

/// Incremental event reader over a byte stream.
pub struct EventReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// Synthesized end event for an empty element, if the underlying
    /// reader delivered one unexpanded.
    pending_end: Option<String>,
}

impl<R: BufRead> EventReader<R> {
    /// Create a reader over the given byte stream.
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;
        config.trim_text_start = false;
        config.trim_text_end = false;
        EventReader {
            reader,
            buf: Vec::with_capacity(512),
            pending_end: None,
        }
    }

    /// Pull the next protocol-relevant event.
    ///
    /// Returns `Ok(None)` at end of stream. Declarations, comments,
    /// processing instructions and DOCTYPE are consumed silently.
    /// A malformed stream yields `Error::Xml`; the stream cannot be
    /// resynchronized after that.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(XmlEvent::End { name }));
        }
        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf).map_err(|e| {
                tracing::warn!(error = %e, "malformed XML from peer");
                Error::Xml {
                    message: e.to_string(),
                }
            })?;

            match event {
                Event::Start(start) => {
                    let name = lower_name(start.name().as_ref());
                    let attrs = decode_attrs(&start)?;
                    return Ok(Some(XmlEvent::Start { name, attrs }));
                }
                Event::End(end) => {
                    return Ok(Some(XmlEvent::End {
                        name: lower_name(end.name().as_ref()),
                    }));
                }
                Event::Text(text) => {
                    let decoded = text
                        .unescape()
                        .map_err(|e| Error::Xml {
                            message: format!("bad character data: {}", e),
                        })?
                        .into_owned();
                    return Ok(Some(XmlEvent::Text(decoded)));
                }
                Event::CData(cdata) => {
                    let raw = cdata.into_inner();
                    let decoded = String::from_utf8_lossy(raw.as_ref()).into_owned();
                    return Ok(Some(XmlEvent::Text(decoded)));
                }
                Event::Empty(start) => {
                    // The reader is configured to expand empty elements;
                    // handle the unexpanded form anyway.
                    let name = lower_name(start.name().as_ref());
                    let attrs = decode_attrs(&start)?;
                    self.pending_end = Some(name.clone());
                    return Ok(Some(XmlEvent::Start { name, attrs }));
                }
                Event::Eof => return Ok(None),
                // Prolog and markup noise carry no protocol meaning.
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {
                    continue
                }
            }
        }
    }
}

fn lower_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn decode_attrs(start: &quick_xml::events::BytesStart<'_>) -> Result<Attrs> {
    let mut pairs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml {
            message: format!("bad attribute: {}", e),
        })?;
        let key = lower_name(attr.key.as_ref());
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml {
                message: format!("bad attribute value: {}", e),
            })?
            .into_owned();
        pairs.push((key, value));
    }
    Ok(Attrs::new(pairs))
}

// =============================================================================
// Tests
// =============================================================================
