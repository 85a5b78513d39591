//! Observer interface: the signals a control emits and who listens to them.

use input_core::FieldId;

use crate::error::TransportError;
use crate::popup::ResultRow;

/// Input and results container a popup toggle refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupTargets {
    pub input: FieldId,
    pub results: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AutocompleteEvent {
    /// Mounted and listening.
    Ready,
    QueryStart { query: String },
    QuerySuccess { query: String, rows: usize },
    QueryError { query: String, error: TransportError },
    /// Closes a query whose response reached the control, after success or error.
    QueryEnd { query: String },
    PopupOpened(PopupTargets),
    PopupClosed(PopupTargets),
    /// User-driven commit. `row` is `None` for accepted free text and
    /// label matches resolved on blur.
    Committed {
        value: String,
        text: String,
        row: Option<ResultRow>,
    },
    /// The canonical value changed because of user interaction.
    Changed { value: String },
    /// A link row was picked; the host navigates.
    LinkActivated { href: String, row: ResultRow },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&AutocompleteEvent)>;

/// Subscribers in subscription order.
///
/// While a dispatch is running the listeners are moved out, so a listener may
/// subscribe or unsubscribe without aliasing the list it is called from.
#[derive(Default)]
pub struct Signals {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    removed: Vec<SubscriptionId>,
    dispatching: bool,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&AutocompleteEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `true` if `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(pos) = self.listeners.iter().position(|(l, _)| *l == id) {
            drop(self.listeners.remove(pos));
            return true;
        }
        if self.dispatching && id.0 <= self.next_id && !self.removed.contains(&id) {
            self.removed.push(id);
            return true;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn emit(&mut self, event: &AutocompleteEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub(crate) fn begin_dispatch(&mut self) -> Vec<(SubscriptionId, Listener)> {
        self.dispatching = true;
        std::mem::take(&mut self.listeners)
    }

    pub(crate) fn end_dispatch(&mut self, mut taken: Vec<(SubscriptionId, Listener)>) {
        let removed = std::mem::take(&mut self.removed);
        taken.retain(|(id, _)| !removed.contains(id));
        taken.append(&mut self.listeners);
        self.listeners = taken;
        self.dispatching = false;
    }
}

impl std::fmt::Debug for Signals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signals")
            .field("listeners", &self.listeners.len())
            .field("dispatching", &self.dispatching)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribe_emit_unsubscribe() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut signals = Signals::new();
        let sink = seen.clone();
        let id = signals.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        signals.emit(&AutocompleteEvent::Ready);
        assert!(signals.unsubscribe(id));
        assert!(!signals.unsubscribe(id));
        signals.emit(&AutocompleteEvent::Ready);

        assert_eq!(*seen.borrow(), vec![AutocompleteEvent::Ready]);
    }

    #[test]
    fn changes_during_dispatch_apply_afterwards() {
        let mut signals = Signals::new();
        let first = signals.subscribe(|_| {});
        let taken = signals.begin_dispatch();
        assert!(signals.unsubscribe(first));
        signals.subscribe(|_| {});
        signals.end_dispatch(taken);
        assert_eq!(signals.len(), 1);
        assert!(!signals.unsubscribe(first));
    }
}
