//! Template sources and `{placeholder}` token extraction.
//!
//! A template is either plain text or the WordprocessingML body of a .docx
//! (`word/document.xml`, headers, footers). Word frequently splits a typed
//! `{ho_ten}` across several `<w:t>` runs, so XML sources are flattened to
//! paragraph text before scanning.

use std::{io::BufRead, io::Read, sync::Arc};

use lazy_static::lazy_static;
use quick_xml::{Reader, events::Event};
use regex::Regex;

use crate::{
    error::Error,
    placeholder::group_placeholders,
    traits::Loader,
    types::PlaceholderGroup,
};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{([^{}]+)\}").unwrap();
}

/// Returns the distinct `{identifier}` tokens of `text`, trimmed, in first-seen order.
///
/// # Example
/// ```rust
/// use docfill::template::extract_placeholders;
/// let keys = extract_placeholders("Tôi là {ho_ten}, sinh ngày { ngay_sinh }, {ho_ten}");
/// assert_eq!(keys, vec!["ho_ten", "ngay_sinh"]);
/// ```
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_REGEX.captures_iter(text) {
        let key = caps[1].trim();
        if !key.is_empty() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Whether `text` looks like WordprocessingML rather than plain text.
pub fn is_word_xml(text: &str) -> bool {
    text.trim_start().starts_with('<') && (text.contains("<w:t") || text.contains("<w:p"))
}

/// Concatenates the `<w:t>` run text of WordprocessingML, one line per paragraph.
pub fn word_xml_text(xml: &str) -> Result<String, Error> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:t" => in_text_run = false,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:p" => out.push('\n'),
            Ok(Event::Text(e)) if in_text_run => {
                out.push_str(&e.unescape().map_err(Error::XmlParse)?);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }
    Ok(out)
}

/// A loaded template: immutable content plus the placeholders found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    content: Arc<[u8]>,
    placeholders: Vec<String>,
    word_xml: bool,
}

impl Template {
    /// Builds a template from decoded text, scanning it for placeholders.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        let word_xml = is_word_xml(text);
        let placeholders = if word_xml {
            extract_placeholders(&word_xml_text(text)?)
        } else {
            extract_placeholders(text)
        };
        log::debug!("template scanned: {} placeholder(s)", placeholders.len());
        Ok(Template {
            content: Arc::from(text.as_bytes()),
            placeholders,
            word_xml,
        })
    }

    /// The template content, shared and read-only.
    pub fn content(&self) -> &Arc<[u8]> {
        &self.content
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn groups(&self) -> Vec<PlaceholderGroup> {
        group_placeholders(&self.placeholders)
    }

    /// Whether the content is WordprocessingML. Such a template needs a
    /// renderer that understands runs and escaping.
    pub fn is_word_xml(&self) -> bool {
        self.word_xml
    }
}

impl Loader for Template {
    /// Decodes UTF-8 or BOM-marked UTF-16 input, then scans it.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(reader);
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;
        Template::from_text(&decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_extract_dedupes_and_trims() {
        let keys = extract_placeholders("{a} {b_1} { a } {b_1}{c}");
        assert_eq!(keys, vec!["a", "b_1", "c"]);
    }

    #[test]
    fn test_extract_ignores_nested_and_empty() {
        assert_eq!(extract_placeholders("{{x}} {} { } {y"), vec!["x"]);
        assert!(extract_placeholders("no tokens").is_empty());
    }

    #[test]
    fn test_word_xml_runs_are_joined() {
        let xml = indoc! {r#"
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>Họ tên: {ho_</w:t></w:r><w:r><w:t>ten_1}</w:t></w:r></w:p>
                <w:p><w:r><w:t xml:space="preserve">Địa chỉ: {dia_chi}</w:t></w:r></w:p>
              </w:body>
            </w:document>
        "#};
        assert!(is_word_xml(xml));
        let text = word_xml_text(xml).unwrap();
        assert!(text.contains("Họ tên: {ho_ten_1}"));
        let template = Template::from_text(xml).unwrap();
        assert_eq!(template.placeholders(), ["ho_ten_1", "dia_chi"]);
        assert!(template.is_word_xml());
    }

    #[test]
    fn test_plain_text_template() {
        let template = Template::from_str("Ông/bà {ho_ten}, {ho_ten_2}").unwrap();
        assert_eq!(template.placeholders(), ["ho_ten", "ho_ten_2"]);
        assert_eq!(template.groups().len(), 1);
        assert!(!template.is_word_xml());
        assert_eq!(&template.content()[..], "Ông/bà {ho_ten}, {ho_ten_2}".as_bytes());
    }

    #[test]
    fn test_utf16_bom_is_decoded() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "{ho_ten}".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let template = Template::from_bytes(&bytes).unwrap();
        assert_eq!(template.placeholders(), ["ho_ten"]);
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mau.txt");
        std::fs::write(&path, "{so_cccd_1} {so_cccd_2}").unwrap();
        let template = Template::read_from(&path).unwrap();
        assert_eq!(template.placeholders(), ["so_cccd_1", "so_cccd_2"]);
    }
}
