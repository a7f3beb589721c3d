//! The fill session: everything an open template editor needs between
//! "scan arrived" and "document rendered".
//!
//! A session holds the active template and its placeholder groups, the slot
//! selector and the current [`FillState`]. Only one fill may be in flight at
//! a time. Payloads that arrive while a fill is in flight, or before a
//! template is ready, wait in a one-slot queue where a newer payload replaces
//! an older one. The in-flight fill ends when the host reports the render
//! result through [`FillSession::complete_fill`] (or uses
//! [`FillSession::render`], which does both); a failed render rolls the fill
//! state back. Slots whose fill rendered successfully are remembered as used
//! until the template changes.
//!
//! ```rust
//! use docfill::{FillSession, SlotChoice, Template, render::TextRenderer, traits::Loader};
//!
//! let mut session = FillSession::new();
//! session.load_template(Template::from_str("{ho_ten_1} / {ho_ten_2}")?);
//! session.choose_slot(SlotChoice::Indexed(2));
//! session.receive_scan_payload(
//!     "012345678901|012345678|Nguyen Van A|01/01/1990|Nam|123 Main St|01/01/2020",
//! );
//! let out = session.render(&TextRenderer)?;
//! assert_eq!(String::from_utf8(out).unwrap(), " / Nguyen Van A");
//! assert_eq!(session.remaining_slot_indices(), vec![1]);
//! # Ok::<(), docfill::Error>(())
//! ```

use std::collections::BTreeSet;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::{
    error::Error,
    formats::{Payload, parse},
    merge::{MergeOptions, MergeReport, merge_with_report},
    normalize::prepare_for_render,
    placeholder::{available_slot_indices, group_placeholders},
    slot::SlotSelector,
    template::Template,
    traits::{RenderError, Renderer},
    types::{FillState, PlaceholderGroup, RawInput, Record, SlotChoice, value_to_text},
};

/// Session behavior options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub merge: MergeOptions,
    /// Hold fills until the user picks a slot when the template has several numbered slots.
    pub prompt_for_slot: bool,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merge(mut self, merge: MergeOptions) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_prompt_for_slot(mut self, prompt: bool) -> Self {
        self.prompt_for_slot = prompt;
        self
    }
}

/// What happened to a payload handed to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FillOutcome {
    /// Merged into the fill state; the fill is now in flight.
    Applied(MergeReport),
    /// Stored until the in-flight fill completes or a template is ready.
    Queued,
    /// Parsed, but held until the user chooses one of `indices`.
    AwaitingSlot { indices: Vec<u32> },
    /// Matched no known format. Nothing was filled.
    Unparsed { raw: String },
    /// Blank input, or the session is closed.
    Empty,
}

/// Notifications for whoever presents the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TemplateChanged {
        groups: Vec<PlaceholderGroup>,
        indices: Vec<u32>,
    },
    SlotChanged(SlotChoice),
    SlotPromptRequested {
        indices: Vec<u32>,
        /// Slots not filled yet; the ones worth offering first.
        remaining: Vec<u32>,
    },
    FillQueued,
    FillApplied {
        state: FillState,
        report: MergeReport,
    },
    FillCompleted,
    RenderFailed {
        message: String,
    },
    Unparsed {
        raw: String,
    },
    Closed,
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

/// The fill waiting for its render result.
#[derive(Debug)]
struct InFlight {
    /// State to restore if the render fails.
    previous: FillState,
    slot: SlotChoice,
}

pub struct FillSession {
    options: SessionOptions,
    template: Option<Template>,
    groups: Vec<PlaceholderGroup>,
    ready: bool,
    closed: bool,
    selector: SlotSelector,
    fill_state: FillState,
    in_flight: Option<InFlight>,
    used_slots: BTreeSet<u32>,
    pending: Option<RawInput>,
    awaiting_slot: Option<Record>,
    listeners: Vec<Listener>,
    clock: Option<NaiveDateTime>,
}

impl Default for FillSession {
    fn default() -> Self {
        Self::with_options(SessionOptions::default())
    }
}

impl std::fmt::Debug for FillSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillSession")
            .field("options", &self.options)
            .field("groups", &self.groups)
            .field("ready", &self.ready)
            .field("closed", &self.closed)
            .field("selector", &self.selector)
            .field("fill_state", &self.fill_state)
            .field("in_flight", &self.in_flight.as_ref().map(|fill| fill.slot))
            .field("used_slots", &self.used_slots)
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FillSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SessionOptions) -> Self {
        FillSession {
            options,
            template: None,
            groups: Vec::new(),
            ready: false,
            closed: false,
            selector: SlotSelector::new(),
            fill_state: FillState::new(),
            in_flight: None,
            used_slots: BTreeSet::new(),
            pending: None,
            awaiting_slot: None,
            listeners: Vec::new(),
            clock: None,
        }
    }

    /// Pins the time used for the `current_*` fields.
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Registers a listener for [`SessionEvent`]s.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: SessionEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Handles a scan or manual-entry payload.
    pub fn receive_scan_payload(&mut self, raw: impl Into<RawInput>) -> FillOutcome {
        let raw = raw.into();
        if self.closed || raw.is_blank() {
            return FillOutcome::Empty;
        }
        if self.in_flight.is_some() || !self.ready {
            if self.pending.replace(raw).is_some() {
                log::info!("replacing queued payload with a newer one");
            } else {
                log::info!("fill queued until the session is ready");
            }
            self.emit(SessionEvent::FillQueued);
            return FillOutcome::Queued;
        }
        self.apply(raw)
    }

    /// Opens `template` and computes its placeholder groups.
    pub fn load_template(&mut self, template: Template) -> Option<FillOutcome> {
        let keys = template.placeholders().to_vec();
        self.template = Some(template);
        self.set_active_template(keys)
    }

    /// Makes `keys` the active template's placeholders.
    ///
    /// Values filled for the previous template are dropped, an unfinished
    /// fill is abandoned and the slot choice goes back to default. A queued
    /// payload survives and is applied to the new template.
    pub fn set_active_template<I, S>(&mut self, keys: I) -> Option<FillOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.closed = false;
        self.ready = true;
        self.awaiting_slot = None;
        self.selector.reset();
        self.fill_state = FillState::new();
        self.in_flight = None;
        self.used_slots.clear();
        self.groups = group_placeholders(keys);
        let indices = available_slot_indices(&self.groups);
        log::info!(
            "template activated: {} group(s), slots {:?}",
            self.groups.len(),
            indices
        );
        self.emit(SessionEvent::TemplateChanged {
            groups: self.groups.clone(),
            indices,
        });
        self.drain_pending()
    }

    /// Recomputes the groups after the template was edited in place. The slot
    /// choice survives unless no numbered slots remain.
    ///
    /// A fill held for a slot choice is applied right away once the edit
    /// leaves nothing to choose between; its outcome is returned.
    pub fn refresh_placeholders<I, S>(&mut self, keys: I) -> Option<FillOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.groups = group_placeholders(keys);
        let indices = available_slot_indices(&self.groups);
        if self.selector.sync_with_indices(&indices) {
            log::info!("no numbered slots left, slot choice reset to default");
            self.emit(SessionEvent::SlotChanged(SlotChoice::Default));
        }
        let release = self.in_flight.is_none() && !self.needs_slot_prompt(&indices);
        self.emit(SessionEvent::TemplateChanged {
            groups: self.groups.clone(),
            indices,
        });
        if !release {
            return None;
        }
        let record = self.awaiting_slot.take()?;
        log::info!("slot prompt no longer needed, applying held fill");
        Some(self.apply_record(record))
    }

    /// Records the user's slot choice and applies a fill that was waiting for it.
    pub fn choose_slot(&mut self, choice: SlotChoice) -> Option<FillOutcome> {
        self.selector.choose(choice);
        self.emit(SessionEvent::SlotChanged(choice));
        if self.in_flight.is_some() {
            return None;
        }
        let record = self.awaiting_slot.take()?;
        Some(self.apply_record(record))
    }

    pub fn slot_choice(&self) -> SlotChoice {
        self.selector.current()
    }

    pub fn available_slot_indices(&self) -> Vec<u32> {
        available_slot_indices(&self.groups)
    }

    /// Numbered slots whose fill rendered successfully since the template was opened.
    pub fn used_slot_indices(&self) -> Vec<u32> {
        self.used_slots.iter().copied().collect()
    }

    /// Available numbered slots that have not been filled yet.
    pub fn remaining_slot_indices(&self) -> Vec<u32> {
        self.available_slot_indices()
            .into_iter()
            .filter(|index| !self.used_slots.contains(index))
            .collect()
    }

    pub fn groups(&self) -> &[PlaceholderGroup] {
        &self.groups
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn fill_state(&self) -> &FillState {
        &self.fill_state
    }

    /// The data handed to the renderer together with the template bytes.
    pub fn merged_fill_data(&self) -> Record {
        self.fill_state.as_record().clone()
    }

    pub fn is_fill_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Ends the in-flight fill with the renderer's result.
    ///
    /// On success the queued payload, if any, is applied and its outcome
    /// returned. On failure the fill state is restored and the renderer's
    /// message is returned verbatim; a queued payload stays queued until
    /// [`FillSession::drain_pending`]. Completions with no fill in flight,
    /// such as those arriving after [`FillSession::close`], are ignored.
    pub fn complete_fill(
        &mut self,
        result: Result<(), RenderError>,
    ) -> Result<Option<FillOutcome>, Error> {
        let Some(fill) = self.in_flight.take() else {
            log::warn!("ignoring fill completion with no fill in flight");
            return Ok(None);
        };
        match result {
            Ok(()) => {
                if let Some(index) = fill.slot.index() {
                    self.used_slots.insert(index);
                }
                self.emit(SessionEvent::FillCompleted);
                Ok(self.drain_pending())
            }
            Err(e) => {
                log::warn!("render failed, fill state rolled back: {}", e.message);
                self.fill_state = fill.previous;
                self.emit(SessionEvent::RenderFailed {
                    message: e.message.clone(),
                });
                Err(e.into())
            }
        }
    }

    /// Renders the current fill state into the active template and completes
    /// the in-flight fill, if any, with the result.
    pub fn render(&mut self, renderer: &dyn Renderer) -> Result<Vec<u8>, Error> {
        let Some(template) = self.template.as_ref() else {
            return Err(Error::NoTemplateLoaded);
        };
        let content = template.content().clone();
        let data = self.merged_fill_data();
        match renderer.render(&content, &data) {
            Ok(bytes) => {
                if self.in_flight.is_some() {
                    self.complete_fill(Ok(()))?;
                }
                Ok(bytes)
            }
            Err(e) if self.in_flight.is_some() => match self.complete_fill(Err(e)) {
                Err(error) => Err(error),
                Ok(_) => Err(Error::render_error("render failed")),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Applies the queued payload when nothing is in flight and a template is ready.
    pub fn drain_pending(&mut self) -> Option<FillOutcome> {
        if self.closed || !self.ready || self.in_flight.is_some() {
            return None;
        }
        let raw = self.pending.take()?;
        log::info!("draining queued payload");
        Some(self.apply(raw))
    }

    /// Resets the session to its initial state and discards anything queued.
    pub fn close(&mut self) {
        self.template = None;
        self.groups.clear();
        self.ready = false;
        self.closed = true;
        self.selector.reset();
        self.fill_state = FillState::new();
        self.in_flight = None;
        self.used_slots.clear();
        self.pending = None;
        self.awaiting_slot = None;
        log::info!("session closed");
        self.emit(SessionEvent::Closed);
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.unwrap_or_else(|| Local::now().naive_local())
    }

    fn apply(&mut self, raw: RawInput) -> FillOutcome {
        let payload = parse(raw);
        if let Payload::Raw(record) = &payload {
            let raw = record.get("raw").map(value_to_text).unwrap_or_default();
            log::warn!("could not understand scanned data");
            self.emit(SessionEvent::Unparsed { raw: raw.clone() });
            return FillOutcome::Unparsed { raw };
        }
        let record = prepare_for_render(payload.record(), self.now());

        let indices = self.available_slot_indices();
        if self.needs_slot_prompt(&indices) {
            log::info!("several slots available {:?}, waiting for a choice", indices);
            self.awaiting_slot = Some(record);
            let remaining = self.remaining_slot_indices();
            self.emit(SessionEvent::SlotPromptRequested {
                indices: indices.clone(),
                remaining,
            });
            return FillOutcome::AwaitingSlot { indices };
        }
        self.apply_record(record)
    }

    fn needs_slot_prompt(&self, indices: &[u32]) -> bool {
        self.options.prompt_for_slot && indices.len() > 1 && !self.selector.is_explicit()
    }

    fn apply_record(&mut self, record: Record) -> FillOutcome {
        let (next, report) = merge_with_report(
            &self.fill_state,
            &record,
            &self.groups,
            self.selector.current(),
            &self.options.merge,
        );
        log::info!(
            "fill applied to slot {}: {} key(s) changed",
            self.selector.current(),
            report.changed()
        );
        self.in_flight = Some(InFlight {
            previous: std::mem::replace(&mut self.fill_state, next),
            slot: self.selector.current(),
        });
        self.emit(SessionEvent::FillApplied {
            state: self.fill_state.clone(),
            report: report.clone(),
        });
        FillOutcome::Applied(report)
    }
}
