//! A plain-text [`Renderer`] for `.txt` templates and tests.

use crate::{
    traits::{RenderError, Renderer},
    types::{Record, value_to_text},
};

/// Substitutes `{key}` tokens in UTF-8 text. Keys missing from the data render empty.
///
/// # Example
/// ```rust
/// use docfill::{render::TextRenderer, traits::Renderer};
/// use serde_json::json;
///
/// let data = json!({"ho_ten": "Nguyễn Văn A"}).as_object().unwrap().clone();
/// let out = TextRenderer.render("Họ tên: {ho_ten} {ghi_chu}".as_bytes(), &data).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "Họ tên: Nguyễn Văn A ");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, template: &[u8], data: &Record) -> Result<Vec<u8>, RenderError> {
        let text = std::str::from_utf8(template)
            .map_err(|e| RenderError::new(format!("template is not valid UTF-8: {}", e)))?;

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| unclosed(&rest[open..]))?;
            let key = &after[..close];
            if key.contains('{') {
                return Err(unclosed(&rest[open..]));
            }
            if let Some(value) = data.get(key.trim()) {
                out.push_str(&value_to_text(value));
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out.into_bytes())
    }
}

fn unclosed(text: &str) -> RenderError {
    let snippet: String = text.chars().take(20).collect();
    RenderError::new(format!("unclosed tag near `{}`", snippet))
}
