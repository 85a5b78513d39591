use std::sync::mpsc::Sender;
use std::time::Instant;

use bus::{CoreCommand, CoreEvent};
use core_types::{ControlId, RequestId};

use crate::config::{AutocompleteConfig, InitialSelection};
use crate::debounce::Debouncer;
use crate::error::{AutocompleteError, ConfigError, TransportError};
use crate::host::{DetachedElement, HostElement};
use crate::option::{OptionItem, OptionList};
use crate::popup::{Phase, Popup, PopupContent, ResultRow};
use crate::signals::{AutocompleteEvent, PopupTargets};
use crate::source::{self, OptionSource};
use crate::value::{ControlFields, ValueInput, ValueModel};

#[derive(Debug)]
struct PendingQuery {
    request_id: RequestId,
    query: String,
}

/// One mounted combobox.
///
/// Everything runs on the caller's thread. Remote queries leave through the
/// bus sender as [`CoreCommand::FetchQuery`] and come back through
/// [`Autocomplete::on_core_event`]; only the most recently dispatched request
/// is accepted. Signals queue up until [`Autocomplete::drain_events`].
pub struct Autocomplete {
    id: ControlId,
    config: AutocompleteConfig,
    source: OptionSource,
    options: OptionList,
    pub(crate) value: ValueModel,
    pub(crate) popup: Popup,
    pub(crate) phase: Phase,
    pub(crate) debounce: Debouncer<String>,
    query_gen: RequestId,
    pending: Option<PendingQuery>,
    /// Display text was edited since the last commit or clear.
    pub(crate) text_dirty: bool,
    /// Canonical value as of the last `Changed` signal or programmatic write.
    reported_value: String,
    pub(crate) results_pointer_down: bool,
    /// Disabled flag to restore when a hidden control is shown again.
    disabled_before_hide: Option<bool>,
    attached: bool,
    host: Box<dyn HostElement>,
    cmd_tx: Option<Sender<CoreCommand>>,
    events: Vec<AutocompleteEvent>,
}

impl Autocomplete {
    /// `options` selects the local strategy when no remote url is configured.
    pub fn new(
        id: ControlId,
        config: AutocompleteConfig,
        fields: ControlFields,
        options: Option<OptionList>,
    ) -> Result<Self, ConfigError> {
        let source = OptionSource::select(&config, options.is_some())?;
        Ok(Self {
            id,
            source,
            options: options.unwrap_or_default(),
            value: ValueModel::new(fields),
            popup: Popup::new("autocomplete"),
            phase: Phase::Start,
            debounce: Debouncer::new(config.debounce()),
            query_gen: 0,
            pending: None,
            text_dirty: false,
            reported_value: String::new(),
            results_pointer_down: false,
            disabled_before_hide: None,
            attached: false,
            host: Box::new(DetachedElement::default()),
            cmd_tx: None,
            events: Vec::new(),
            config,
        })
    }

    pub fn with_results_id(mut self, results_id: &str) -> Self {
        self.popup = Popup::new(results_id);
        self
    }

    pub fn with_host(mut self, host: Box<dyn HostElement>) -> Self {
        self.host = host;
        self
    }

    pub fn set_bus_sender(&mut self, tx: Sender<CoreCommand>) {
        self.cmd_tx = Some(tx);
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    pub fn source(&self) -> &OptionSource {
        &self.source
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn popup(&self) -> &Popup {
        &self.popup
    }

    pub fn value_model(&self) -> &ValueModel {
        &self.value
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn display_text(&self) -> &str {
        self.value.display_text()
    }

    pub fn canonical_value(&self) -> &str {
        self.value.canonical()
    }

    /// Request id of the query whose response would still be applied.
    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|q| q.request_id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.attached { self.debounce.deadline() } else { None }
    }

    pub fn drain_events(&mut self) -> Vec<AutocompleteEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: AutocompleteEvent) {
        log::trace!(target: "autocomplete", "control {} emits {:?}", self.id, event);
        self.events.push(event);
    }

    // -- Lifecycle ---
    pub fn mount(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        if let Some(init) = self.config.init_selection.clone() {
            self.apply_initial_selection(init);
        }
        self.reported_value = self.value.canonical().to_string();
        self.phase = if self.value.canonical().is_empty() {
            Phase::Ready
        } else {
            Phase::Committed
        };
        log::debug!(
            target: "autocomplete",
            "control {} mounted (source: {})",
            self.id,
            match self.source {
                OptionSource::Remote(_) => "remote",
                OptionSource::Local => "local",
                OptionSource::Unconfigured => "none",
            }
        );
        self.emit(AutocompleteEvent::Ready);
    }

    /// Detach: pending timers and queries are dropped and no further events
    /// are handled until the next mount.
    pub fn unmount(&mut self) {
        if !self.attached {
            return;
        }
        self.debounce.cancel();
        self.abandon_query();
        self.popup.close();
        self.popup.clear();
        self.results_pointer_down = false;
        self.attached = false;
        self.phase = Phase::Start;
        log::debug!(target: "autocomplete", "control {} unmounted", self.id);
    }

    fn apply_initial_selection(&mut self, init: InitialSelection) {
        let text = if init.text.is_empty() { &init.value } else { &init.text };
        if init.value.is_empty() {
            if self.config.allow_other_values && !text.is_empty() {
                self.value.commit(text, text);
            }
            return;
        }
        if self.source == OptionSource::Local && self.options.find_by_value(&init.value).is_none() {
            self.options.push(OptionItem::new(init.value.as_str(), text.as_str()));
        }
        self.value.commit(&init.value, text);
    }

    // -- Value Model ---
    /// Value a host reads back; see [`ValueModel::value`].
    pub fn value(&self) -> &str {
        self.value.value(self.config.allow_other_values)
    }

    /// Programmatic assignment. Emits no commit or change signal.
    pub fn set_value(&mut self, input: impl Into<ValueInput>) {
        self.debounce.cancel();
        self.abandon_query();
        self.hide_and_clear_results();

        let (value, text) = match input.into() {
            ValueInput::Pair { value, text } => (value, text),
            ValueInput::Bare(v) if v.is_empty() => (String::new(), String::new()),
            // a disabled option is still applied with its own label
            ValueInput::Bare(v) => match self.options.find_by_value(&v) {
                Some(item) => (item.value.clone(), item.text.clone()),
                None if self.source == OptionSource::Local => {
                    self.options.push(OptionItem::new(v.as_str(), v.as_str()));
                    (v.clone(), v)
                }
                None if self.config.allow_other_values => (v.clone(), v),
                None => {
                    log::debug!(target: "autocomplete.value", "rejecting unknown value {v:?}");
                    (String::new(), String::new())
                }
            },
        };
        self.value.commit(&value, &text);
        self.text_dirty = false;
        self.reported_value = value.clone();
        if self.attached {
            self.phase = if value.is_empty() && text.is_empty() {
                Phase::Ready
            } else {
                Phase::Committed
            };
        }
    }

    /// Empty display text and canonical value. Rendered rows stay.
    pub fn clear(&mut self) {
        self.debounce.cancel();
        self.abandon_query();
        self.value.clear();
        self.text_dirty = false;
        self.reported_value.clear();
        self.close_popup();
        if self.attached {
            self.phase = Phase::Ready;
        }
    }

    pub fn options(&self) -> &OptionList {
        &self.options
    }

    pub fn set_options(&mut self, options: OptionList) {
        self.options = options;
    }

    pub fn add_option(&mut self, item: OptionItem) -> bool {
        self.options.push(item)
    }

    pub fn is_disabled(&self) -> bool {
        self.value.is_disabled()
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        if !self.value.set_disabled(disabled) {
            return;
        }
        if disabled {
            self.debounce.cancel();
            self.abandon_query();
            self.hide_and_clear_results();
            self.results_pointer_down = false;
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.host.is_hidden()
    }

    /// Hiding also disables, so a hidden control never submits. Showing it
    /// again restores the disabled flag it had before it was hidden.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.host.set_hidden(hidden);
        if hidden {
            if self.disabled_before_hide.is_none() {
                self.disabled_before_hide = Some(self.is_disabled());
            }
            self.set_disabled(true);
        } else {
            let disabled = self
                .disabled_before_hide
                .take()
                .unwrap_or_else(|| self.is_disabled());
            self.set_disabled(disabled);
        }
    }

    pub fn form_entries(&self) -> Vec<(&str, &str)> {
        self.value.form_entries()
    }

    // -- Queries ---
    /// Run the debounced query once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Result<(), AutocompleteError> {
        if !self.attached {
            return Ok(());
        }
        match self.debounce.take_due(now) {
            Some(text) => self.run_query(&text),
            None => Ok(()),
        }
    }

    pub(crate) fn schedule_query(&mut self, now: Instant) {
        let text = self.value.display_text().to_string();
        if self.debounce.schedule(now, text) {
            log::trace!(target: "autocomplete.query", "control {}: debounce restarted", self.id);
        }
    }

    pub(crate) fn run_query(&mut self, raw: &str) -> Result<(), AutocompleteError> {
        let query = raw.trim().to_string();
        let url = match &self.source {
            OptionSource::Unconfigured => {
                log::warn!(target: "autocomplete.query", "control {} has no option source", self.id);
                return Err(AutocompleteError::MissingSource);
            }
            OptionSource::Local => {
                self.run_local(query);
                return Ok(());
            }
            OptionSource::Remote(endpoint) => endpoint.query_url(&query),
        };

        if query.is_empty() || query.chars().count() < self.config.min_query_length {
            self.abandon_query();
            self.hide_and_clear_results();
            self.phase = Phase::Ready;
            return Ok(());
        }

        self.abandon_query();
        self.query_gen += 1;
        let request_id = self.query_gen;
        let cmd = CoreCommand::FetchQuery {
            control_id: self.id,
            request_id,
            url: url.to_string(),
        };
        if !self.send(cmd) {
            log::warn!(target: "autocomplete.query", "control {}: no network bus for {url}", self.id);
            return Err(AutocompleteError::NoTransport);
        }
        log::debug!(target: "autocomplete.query", "control {} dispatched #{request_id} {url}", self.id);
        self.pending = Some(PendingQuery {
            request_id,
            query: query.clone(),
        });
        self.phase = Phase::Searching;
        self.emit(AutocompleteEvent::QueryStart { query });
        Ok(())
    }

    fn run_local(&mut self, query: String) {
        self.phase = Phase::Searching;
        self.emit(AutocompleteEvent::QueryStart {
            query: query.clone(),
        });
        let rows: Vec<ResultRow> = source::filter_local(&self.options, &query).collect();
        let count = rows.len();
        self.apply_rows(rows, PopupContent::Rows);
        self.emit(AutocompleteEvent::QuerySuccess {
            query: query.clone(),
            rows: count,
        });
        self.emit(AutocompleteEvent::QueryEnd { query });
    }

    /// Apply a network response. Responses for any request other than the
    /// latest dispatched one are dropped without side effects.
    pub fn on_core_event(&mut self, evt: CoreEvent) -> Result<(), AutocompleteError> {
        match evt {
            CoreEvent::QueryLoaded {
                control_id,
                request_id,
                url,
                status,
                body,
                ..
            } if self.is_current(control_id, request_id) => self.on_query_loaded(url, status, body),

            CoreEvent::QueryFailed {
                control_id,
                request_id,
                url,
                error,
                ..
            } if self.is_current(control_id, request_id) => self.on_query_failed(TransportError::Network {
                url,
                message: error,
            }),

            other => {
                if other.control_id() == self.id {
                    log::debug!(
                        target: "autocomplete.query",
                        "control {}: dropping stale response #{} (current {:?})",
                        self.id,
                        other.request_id(),
                        self.pending_request()
                    );
                }
                Ok(())
            }
        }
    }

    fn is_current(&self, control_id: ControlId, request_id: RequestId) -> bool {
        control_id == self.id && self.pending_request() == Some(request_id)
    }

    fn on_query_loaded(&mut self, url: String, status: u16, body: String) -> Result<(), AutocompleteError> {
        let rows = match source::rows_from_response(&url, status, &body) {
            Ok(rows) => rows,
            Err(error) => return self.on_query_failed(error),
        };
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let count = rows.len();
        self.apply_rows(rows, PopupContent::Markup(body));
        self.emit(AutocompleteEvent::QuerySuccess {
            query: pending.query.clone(),
            rows: count,
        });
        self.emit(AutocompleteEvent::QueryEnd {
            query: pending.query,
        });
        Ok(())
    }

    /// The popup and value are left as they were.
    fn on_query_failed(&mut self, error: TransportError) -> Result<(), AutocompleteError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        log::warn!(target: "autocomplete.query", "control {}: {error}", self.id);
        self.phase = if self.popup.is_open() {
            Phase::HasResults
        } else {
            Phase::Ready
        };
        self.emit(AutocompleteEvent::QueryError {
            query: pending.query.clone(),
            error: error.clone(),
        });
        self.emit(AutocompleteEvent::QueryEnd {
            query: pending.query,
        });
        Err(error.into())
    }

    fn apply_rows(&mut self, rows: Vec<ResultRow>, content: PopupContent) {
        let has_rows = !rows.is_empty();
        self.popup.replace(rows, content);
        if has_rows {
            self.phase = Phase::HasResults;
            self.open_popup();
        } else {
            self.phase = Phase::Empty;
            self.close_popup();
        }
    }

    /// Forget the in-flight request; its response will be ignored. The
    /// query still gets its end signal, without success or error.
    pub(crate) fn abandon_query(&mut self) {
        if let Some(q) = self.pending.take() {
            log::debug!(
                target: "autocomplete.query",
                "control {}: abandoning #{} ({:?})",
                self.id,
                q.request_id,
                q.query
            );
            self.send(CoreCommand::CancelRequest {
                control_id: self.id,
                request_id: q.request_id,
            });
            self.emit(AutocompleteEvent::QueryEnd { query: q.query });
        }
    }

    fn send(&self, cmd: CoreCommand) -> bool {
        self.cmd_tx.as_ref().is_some_and(|tx| tx.send(cmd).is_ok())
    }

    // -- Popup ---
    fn targets(&self) -> PopupTargets {
        PopupTargets {
            input: self.value.input_id(),
            results: self.popup.results_id().to_string(),
        }
    }

    pub(crate) fn open_popup(&mut self) {
        if self.popup.open() {
            log::trace!(target: "autocomplete.popup", "control {} popup opened", self.id);
            let targets = self.targets();
            self.emit(AutocompleteEvent::PopupOpened(targets));
        }
    }

    pub(crate) fn close_popup(&mut self) {
        if self.popup.close() {
            log::trace!(target: "autocomplete.popup", "control {} popup closed", self.id);
            let targets = self.targets();
            self.emit(AutocompleteEvent::PopupClosed(targets));
        }
    }

    pub(crate) fn hide_and_clear_results(&mut self) {
        self.close_popup();
        self.popup.clear();
    }

    // -- Commit ---
    /// Finalize a picked row. Disabled rows are ignored; link rows are
    /// reported instead of committed.
    pub(crate) fn commit_row(&mut self, row: ResultRow) {
        if row.disabled {
            log::trace!(target: "autocomplete.value", "ignoring disabled row {}", row.id);
            return;
        }
        self.debounce.cancel();
        self.abandon_query();
        self.hide_and_clear_results();
        self.phase = Phase::Committed;

        if let Some(href) = row.href.clone() {
            self.emit(AutocompleteEvent::LinkActivated { href, row });
            return;
        }

        self.value.commit(&row.value, &row.label);
        self.text_dirty = false;
        self.emit(AutocompleteEvent::Committed {
            value: row.value.clone(),
            text: row.label.clone(),
            row: Some(row),
        });
        self.emit_changed();
    }

    fn commit_text(&mut self, value: &str, text: &str) {
        self.value.commit(value, text);
        self.text_dirty = false;
        self.phase = Phase::Committed;
        self.emit(AutocompleteEvent::Committed {
            value: value.to_string(),
            text: text.to_string(),
            row: None,
        });
        self.emit_changed();
    }

    pub(crate) fn clear_with_signal(&mut self) {
        self.value.clear();
        self.text_dirty = false;
        self.phase = Phase::Ready;
        self.emit_changed();
    }

    /// Announce the canonical value if it differs from the last one reported.
    /// Edits clear the canonical value silently; the change is reported once
    /// the interaction settles.
    fn emit_changed(&mut self) {
        if self.value.canonical() == self.reported_value {
            return;
        }
        let value = self.value.canonical().to_string();
        log::debug!(target: "autocomplete.value", "control {} value -> {value:?}", self.id);
        self.reported_value.clone_from(&value);
        self.emit(AutocompleteEvent::Changed { value });
    }

    /// Decide what typed-but-uncommitted text becomes when focus leaves.
    pub(crate) fn resolve_typed_text(&mut self) {
        let text = self.value.display_text().trim().to_string();
        if text.is_empty() {
            self.clear_with_signal();
            return;
        }
        if self.config.allow_other_values {
            self.commit_text(&text, &text);
            return;
        }
        let row_match = self
            .popup
            .rows()
            .iter()
            .find(|r| !r.disabled && r.href.is_none() && r.label == text)
            .map(|r| (r.value.clone(), r.label.clone()));
        let option_match = || {
            self.options
                .find_enabled_by_text(&text)
                .map(|o| (o.value.clone(), o.text.clone()))
        };
        match row_match.or_else(option_match) {
            Some((value, label)) => self.commit_text(&value, &label),
            None => {
                log::debug!(target: "autocomplete.value", "rejecting free text {text:?}");
                self.clear_with_signal();
            }
        }
    }
}

impl std::fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("source", &self.source)
            .field("value", &self.value)
            .field("popup", &self.popup)
            .field("pending", &self.pending)
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}
