#![forbid(unsafe_code)]
//! Scan-data normalization and placeholder resolution for filling Word templates
//! of Vietnamese administrative procedures (TTHC).
//!
//! Turns whatever a QR/ID scanner or a clerk pastes (JSON, pipe or comma
//! delimited citizen-ID strings, header/value line pairs) into a record whose
//! fields match the template's `{placeholder}` tokens, including numbered
//! per-party slots such as `{ho_ten_1}` and `{ho_ten_2}`.
//!
//! # Quick Start
//!
//! ```rust
//! use docfill::{FillSession, SlotChoice, Template, render::TextRenderer, traits::Loader};
//!
//! let mut session = FillSession::new();
//! let template = Template::from_str("Người thứ nhất: {ho_ten_1}, sinh ngày {ngay_sinh_1}")?;
//! session.load_template(template);
//! session.choose_slot(SlotChoice::Indexed(1));
//! session.receive_scan_payload(r#"{"ho_ten": "Nguyễn Văn A", "ngay_sinh": "19900101"}"#);
//!
//! let out = session.render(&TextRenderer)?;
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "Người thứ nhất: Nguyễn Văn A, sinh ngày 01/01/1990"
//! );
//! # Ok::<(), docfill::Error>(())
//! ```
//!
//! # Pipeline
//!
//! - **Format detection** ([`formats`]): JSON, header/value pairs, pipe, comma, raw fallback
//! - **Normalization** ([`normalize`]): every alias of a known field gets the same value
//! - **Placeholder discovery** ([`template`], [`placeholder`]): tokens grouped by base key
//! - **Slot selection** ([`slot`]): which numbered variant a fill writes to
//! - **Merge** ([`merge`]): new data joined into the running fill state
//! - **Session** ([`session`]): one fill in flight, a last-write-wins queue, render hand-off

pub mod aliases;
pub mod dates;
pub mod error;
pub mod formats;
pub mod merge;
pub mod normalize;
pub mod placeholder;
pub mod render;
pub mod session;
pub mod slot;
pub mod template;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    formats::{Payload, PayloadFormat, parse, parse_text},
    merge::{MergeMode, MergeOptions, MergeReport, merge},
    normalize::normalize,
    session::{FillOutcome, FillSession, SessionEvent, SessionOptions},
    template::Template,
    types::{FillState, PlaceholderGroup, RawInput, Record, SlotChoice},
};
