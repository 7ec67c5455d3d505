//! XML writing and escaping helpers.
//!
//! Response XML is produced by direct byte emission; nothing is ever
//! buffered into a tree. The helpers here keep escaping in one place.

use crate::error::Result;
use crate::sink::OutputSink;

/// Escape character data for element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a value for a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Thin element writer over an output sink.
///
/// The writer does not track nesting; callers emit matched tags. This
/// mirrors how responses are produced: each response function owns its
/// envelope from open to close.
pub struct XmlWriter<'a, S: OutputSink> {
    sink: &'a mut S,
}

impl<'a, S: OutputSink> XmlWriter<'a, S> {
    /// Wrap a sink.
    pub fn new(sink: &'a mut S) -> Self {
        XmlWriter { sink }
    }

    /// Write raw, pre-escaped bytes.
    pub fn raw(&mut self, data: &str) -> Result<()> {
        self.sink.write(data.as_bytes())
    }

    /// `<name attr="..">` with escaped attribute values.
    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.open_tag(name, attrs, false)
    }

    /// `<name attr=".."/>`.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.open_tag(name, attrs, true)
    }

    /// `</name>`.
    pub fn end(&mut self, name: &str) -> Result<()> {
        self.sink.write(b"</")?;
        self.sink.write(name.as_bytes())?;
        self.sink.write(b">")
    }

    /// `<name>text</name>` with escaped content.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    /// Escaped character data.
    pub fn text(&mut self, text: &str) -> Result<()> {
        self.sink.write(escape_text(text).as_bytes())
    }

    fn open_tag(&mut self, name: &str, attrs: &[(&str, &str)], empty: bool) -> Result<()> {
        self.sink.write(b"<")?;
        self.sink.write(name.as_bytes())?;
        for (key, value) in attrs {
            self.sink.write(b" ")?;
            self.sink.write(key.as_bytes())?;
            self.sink.write(b"=\"")?;
            self.sink.write(escape_attr(value).as_bytes())?;
            self.sink.write(b"\"")?;
        }
        if empty {
            self.sink.write(b"/>")
        } else {
            self.sink.write(b">")
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
