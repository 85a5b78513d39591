//! Native input events routed into the popup state machine.

use std::time::Instant;

use crate::config::BlurWhileSearching;
use crate::controller::Autocomplete;
use crate::error::AutocompleteError;
use crate::popup::{Direction, Phase};
use crate::source::OptionSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    SelectAll,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    KeyDown(Key),
    /// Characters typed at the caret.
    TextInput(String),
    /// Whole new input value (paste, IME commit, host sync).
    Input(String),
    /// Click on the visible input.
    Click,
    Focus,
    Blur,
    ResultsPointerDown,
    ResultsPointerUp,
    ResultsClick { row_id: String },
    ClearClick,
}

/// What the host should do with the native event afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventOutcome {
    fn prevent() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: false,
        }
    }

    fn consume() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: true,
        }
    }
}

impl Autocomplete {
    /// Route one input event. Nothing happens while unmounted, and a disabled
    /// control only reacts to focus loss.
    pub fn handle_event(&mut self, event: UiEvent, now: Instant) -> Result<EventOutcome, AutocompleteError> {
        if !self.is_attached() {
            log::trace!(target: "autocomplete", "control {} not mounted, ignoring {event:?}", self.id());
            return Ok(EventOutcome::default());
        }
        if self.is_disabled() && !matches!(event, UiEvent::Blur | UiEvent::ResultsPointerUp) {
            return Ok(EventOutcome::default());
        }

        let input = self.value.input_id();
        match event {
            UiEvent::KeyDown(key) => self.on_key_down(key, now),
            UiEvent::TextInput(text) => {
                let rev = self.value.store().value_revision(input);
                self.value.store_mut().insert_text(input, &text);
                self.after_edit(rev, now);
                Ok(EventOutcome::default())
            }
            UiEvent::Input(text) => {
                let rev = self.value.store().value_revision(input);
                self.value.store_mut().set(input, &text);
                self.after_edit(rev, now);
                Ok(EventOutcome::default())
            }
            UiEvent::Click => {
                if *self.source() == OptionSource::Local && !self.popup.is_open() {
                    self.debounce.cancel();
                    let text = self.value.display_text().to_string();
                    self.run_query(&text)?;
                }
                Ok(EventOutcome::default())
            }
            UiEvent::Focus => {
                self.value.store_mut().focus(input);
                Ok(EventOutcome::default())
            }
            UiEvent::Blur => {
                self.on_blur();
                Ok(EventOutcome::default())
            }
            UiEvent::ResultsPointerDown => {
                self.results_pointer_down = true;
                Ok(EventOutcome::default())
            }
            UiEvent::ResultsPointerUp => {
                self.results_pointer_down = false;
                Ok(EventOutcome::default())
            }
            UiEvent::ResultsClick { row_id } => {
                self.results_pointer_down = false;
                match self.popup.row_by_id(&row_id).cloned() {
                    Some(row) => self.commit_row(row),
                    None => log::debug!(target: "autocomplete.popup", "click on unknown row {row_id:?}"),
                }
                Ok(EventOutcome::default())
            }
            UiEvent::ClearClick => {
                if self.value.clear_button_enabled() {
                    self.debounce.cancel();
                    self.abandon_query();
                    self.close_popup();
                    self.clear_with_signal();
                }
                Ok(EventOutcome::prevent())
            }
        }
    }

    fn on_key_down(&mut self, key: Key, now: Instant) -> Result<EventOutcome, AutocompleteError> {
        let input = self.value.input_id();
        match key {
            Key::ArrowDown | Key::ArrowUp if self.popup.is_open() => {
                let direction = if key == Key::ArrowDown {
                    Direction::Next
                } else {
                    Direction::Previous
                };
                self.popup.move_active(direction);
                Ok(EventOutcome::prevent())
            }
            Key::Enter => match self.popup.active_row().filter(|_| self.popup.is_open()).cloned() {
                Some(row) => {
                    self.commit_row(row);
                    if self.config().submit_on_enter {
                        Ok(EventOutcome::default())
                    } else {
                        Ok(EventOutcome::prevent())
                    }
                }
                None => Ok(EventOutcome::default()),
            },
            Key::Tab => {
                if let Some(row) = self.popup.active_row().filter(|_| self.popup.is_open()).cloned() {
                    self.commit_row(row);
                }
                Ok(EventOutcome::default())
            }
            Key::Escape if self.popup.is_open() => {
                self.debounce.cancel();
                self.abandon_query();
                self.hide_and_clear_results();
                if self.phase.is_mid_interaction() {
                    self.phase = Phase::Ready;
                }
                Ok(EventOutcome::consume())
            }
            Key::Backspace | Key::Delete => {
                let rev = self.value.store().value_revision(input);
                let store = self.value.store_mut();
                if key == Key::Backspace {
                    store.backspace(input);
                } else {
                    store.delete(input);
                }
                self.after_edit(rev, now);
                Ok(EventOutcome::default())
            }
            Key::ArrowLeft => self.caret(|s, id| s.move_caret_left(id)),
            Key::ArrowRight => self.caret(|s, id| s.move_caret_right(id)),
            Key::Home => self.caret(|s, id| s.move_caret_to_start(id)),
            Key::End => self.caret(|s, id| s.move_caret_to_end(id)),
            Key::SelectAll => self.caret(|s, id| s.select_all(id)),
            _ => Ok(EventOutcome::default()),
        }
    }

    fn caret(
        &mut self,
        f: impl FnOnce(&mut input_core::FieldStore, input_core::FieldId),
    ) -> Result<EventOutcome, AutocompleteError> {
        let input = self.value.input_id();
        f(self.value.store_mut(), input);
        Ok(EventOutcome::default())
    }

    fn after_edit(&mut self, rev_before: u64, now: Instant) {
        let input = self.value.input_id();
        if self.value.store().value_revision(input) == rev_before {
            return;
        }
        self.text_dirty = true;
        if self.value.invalidate_canonical() {
            log::trace!(target: "autocomplete.value", "control {} canonical value cleared by edit", self.id());
        }
        if matches!(self.phase, Phase::Start | Phase::Committed) {
            self.phase = Phase::Ready;
        }
        self.schedule_query(now);
    }

    fn on_blur(&mut self) {
        if self.results_pointer_down {
            log::trace!(target: "autocomplete", "control {} blur ignored during results click", self.id());
            return;
        }
        let input = self.value.input_id();
        self.value.store_mut().blur(input);
        self.debounce.cancel();
        let was_searching = self.phase == Phase::Searching;
        self.abandon_query();

        // a disabled field keeps whatever text it shows
        if self.phase.is_mid_interaction() && self.text_dirty && !self.is_disabled() {
            if was_searching && self.config().blur_while_searching == BlurWhileSearching::Clear {
                self.clear_with_signal();
            } else {
                self.resolve_typed_text();
            }
        }
        self.hide_and_clear_results();
        if self.phase.is_mid_interaction() {
            self.phase = if self.value.canonical().is_empty() {
                Phase::Ready
            } else {
                Phase::Committed
            };
        }
    }
}
