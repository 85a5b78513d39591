use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use bus::CoreEvent;
use core_types::ControlId;

use crate::binding::{EventOutcome, UiEvent};
use crate::controller::Autocomplete;
use crate::error::AutocompleteError;
use crate::option::{OptionItem, OptionList};
use crate::signals::{AutocompleteEvent, Signals, SubscriptionId};
use crate::value::ValueInput;

/// Typed handle returned by a mount.
///
/// Clones share the same control. Every call that can change state delivers
/// the resulting signals to subscribers before returning; a listener may call
/// back into the handle, and its own signals are delivered after the current
/// batch.
#[derive(Clone)]
pub struct AutocompleteHandle {
    inner: Rc<RefCell<Autocomplete>>,
    signals: Rc<RefCell<Signals>>,
    dispatching: Rc<Cell<bool>>,
}

impl AutocompleteHandle {
    pub fn new(control: Autocomplete) -> Self {
        Self {
            inner: Rc::new(RefCell::new(control)),
            signals: Rc::new(RefCell::new(Signals::new())),
            dispatching: Rc::new(Cell::new(false)),
        }
    }

    pub fn control_id(&self) -> ControlId {
        self.inner.borrow().id()
    }

    /// Read-only access for rendering.
    pub fn with<R>(&self, f: impl FnOnce(&Autocomplete) -> R) -> R {
        f(&*self.inner.borrow())
    }

    pub fn mount(&self) {
        self.update(Autocomplete::mount)
    }

    pub fn unmount(&self) {
        self.update(Autocomplete::unmount)
    }

    pub fn get_value(&self) -> String {
        self.inner.borrow().value().to_string()
    }

    pub fn set_value(&self, input: impl Into<ValueInput>) {
        let input = input.into();
        self.update(|ac| ac.set_value(input))
    }

    pub fn clear(&self) {
        self.update(Autocomplete::clear)
    }

    pub fn display_text(&self) -> String {
        self.inner.borrow().display_text().to_string()
    }

    pub fn get_options(&self) -> OptionList {
        self.inner.borrow().options().clone()
    }

    pub fn set_options(&self, options: OptionList) {
        self.update(|ac| ac.set_options(options))
    }

    pub fn add_option(&self, item: OptionItem) -> bool {
        self.update(|ac| ac.add_option(item))
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.borrow().is_disabled()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.update(|ac| ac.set_disabled(disabled))
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.borrow().is_hidden()
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.update(|ac| ac.set_hidden(hidden))
    }

    pub fn form_entries(&self) -> Vec<(String, String)> {
        self.inner
            .borrow()
            .form_entries()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    pub fn subscribe(&self, listener: impl FnMut(&AutocompleteEvent) + 'static) -> SubscriptionId {
        self.signals.borrow_mut().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.signals.borrow_mut().unsubscribe(id)
    }

    pub fn handle_event(&self, event: UiEvent, now: Instant) -> Result<EventOutcome, AutocompleteError> {
        self.update(|ac| ac.handle_event(event, now))
    }

    pub fn poll(&self, now: Instant) -> Result<(), AutocompleteError> {
        self.update(|ac| ac.poll(now))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.borrow().next_deadline()
    }

    pub fn on_core_event(&self, evt: CoreEvent) -> Result<(), AutocompleteError> {
        self.update(|ac| ac.on_core_event(evt))
    }

    fn update<R>(&self, f: impl FnOnce(&mut Autocomplete) -> R) -> R {
        let out = f(&mut *self.inner.borrow_mut());
        self.flush();
        out
    }

    fn flush(&self) {
        if self.dispatching.get() {
            return;
        }
        self.dispatching.set(true);
        loop {
            let events = self.inner.borrow_mut().drain_events();
            if events.is_empty() {
                break;
            }
            let mut listeners = self.signals.borrow_mut().begin_dispatch();
            for event in &events {
                for (_, listener) in listeners.iter_mut() {
                    listener(event);
                }
            }
            self.signals.borrow_mut().end_dispatch(listeners);
        }
        self.dispatching.set(false);
    }
}

impl std::fmt::Debug for AutocompleteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteHandle")
            .field("control", &self.inner.try_borrow().map(|ac| ac.id()).ok())
            .field("signals", &self.signals)
            .finish()
    }
}
