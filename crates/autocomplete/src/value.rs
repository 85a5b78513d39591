use input_core::{FieldId, FieldSpec, FieldStore};

/// The form fields one control is bound to.
///
/// `input` holds the display text, `hidden` the canonical value that is
/// submitted. `hidden_text` (optional) mirrors the label for forms that post
/// it, and `clear_button` (optional) is modelled as a field so its disabled
/// flag travels with the others.
#[derive(Debug)]
pub struct ControlFields {
    pub store: FieldStore,
    pub input: FieldId,
    pub hidden: FieldId,
    pub hidden_text: Option<FieldId>,
    pub clear_button: Option<FieldId>,
}

impl ControlFields {
    /// Fresh store with an unnamed text input and a hidden field called `hidden_name`.
    pub fn new(hidden_name: &str) -> Self {
        let mut store = FieldStore::new();
        let input = store.register(FieldSpec::default());
        let hidden = store.register(FieldSpec::named(hidden_name));
        Self {
            store,
            input,
            hidden,
            hidden_text: None,
            clear_button: None,
        }
    }

    pub fn with_hidden_text(mut self, name: &str) -> Self {
        self.hidden_text = Some(self.store.register(FieldSpec::named(name)));
        self
    }

    pub fn with_clear_button(mut self) -> Self {
        self.clear_button = Some(self.store.register(FieldSpec::default()));
        self
    }
}

/// Argument to `set_value`: an explicit pair, or a bare value resolved
/// against the candidate list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueInput {
    Pair { value: String, text: String },
    Bare(String),
}

impl From<&str> for ValueInput {
    fn from(value: &str) -> Self {
        ValueInput::Bare(value.to_string())
    }
}

impl From<String> for ValueInput {
    fn from(value: String) -> Self {
        ValueInput::Bare(value)
    }
}

impl From<(&str, &str)> for ValueInput {
    fn from((value, text): (&str, &str)) -> Self {
        ValueInput::Pair {
            value: value.to_string(),
            text: text.to_string(),
        }
    }
}

impl From<(String, String)> for ValueInput {
    fn from((value, text): (String, String)) -> Self {
        ValueInput::Pair { value, text }
    }
}

/// Display text and canonical value, kept consistent with each other.
#[derive(Debug)]
pub struct ValueModel {
    store: FieldStore,
    input: FieldId,
    hidden: FieldId,
    hidden_text: Option<FieldId>,
    clear_button: Option<FieldId>,
    disabled: bool,
}

impl ValueModel {
    pub fn new(fields: ControlFields) -> Self {
        let disabled = fields.store.is_disabled(fields.input);
        let mut model = Self {
            store: fields.store,
            input: fields.input,
            hidden: fields.hidden,
            hidden_text: fields.hidden_text,
            clear_button: fields.clear_button,
            disabled,
        };
        model.sync_clear_button();
        model
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut FieldStore {
        &mut self.store
    }

    pub fn input_id(&self) -> FieldId {
        self.input
    }

    pub fn hidden_id(&self) -> FieldId {
        self.hidden
    }

    pub fn display_text(&self) -> &str {
        self.store.value(self.input)
    }

    pub fn canonical(&self) -> &str {
        self.store.value(self.hidden)
    }

    pub fn hidden_text(&self) -> Option<&str> {
        self.hidden_text.map(|id| self.store.value(id))
    }

    /// The value a host reads back.
    ///
    /// With free text allowed the display text wins once it diverges from a
    /// committed label; otherwise only the canonical value counts.
    pub fn value(&self, allow_other: bool) -> &str {
        let canonical = self.canonical();
        if !allow_other {
            return canonical;
        }
        let text = self.display_text();
        if canonical.is_empty() || self.hidden_text().is_some_and(|label| label != text) {
            text
        } else {
            canonical
        }
    }

    /// Store a committed pair. Returns `true` if anything changed.
    pub(crate) fn commit(&mut self, value: &str, text: &str) -> bool {
        let mut changed = self.store.set(self.input, text);
        changed |= self.store.set(self.hidden, value);
        if let Some(id) = self.hidden_text {
            changed |= self.store.set(id, text);
        }
        self.sync_clear_button();
        changed
    }

    pub(crate) fn clear(&mut self) -> bool {
        self.commit("", "")
    }

    /// The user edited the display text: the previous commitment no longer holds.
    pub(crate) fn invalidate_canonical(&mut self) -> bool {
        let changed = self.store.set(self.hidden, "");
        if let Some(id) = self.hidden_text {
            let text = self.store.value(self.input).to_string();
            self.store.set(id, &text);
        }
        self.sync_clear_button();
        changed
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Applies to every bound field at once.
    pub(crate) fn set_disabled(&mut self, disabled: bool) -> bool {
        let changed = self.disabled != disabled;
        self.disabled = disabled;
        for id in [Some(self.input), Some(self.hidden), self.hidden_text]
            .into_iter()
            .flatten()
        {
            self.store.set_disabled(id, disabled);
        }
        self.sync_clear_button();
        changed
    }

    pub fn clear_button_enabled(&self) -> bool {
        self.clear_button
            .is_some_and(|id| !self.store.is_disabled(id))
    }

    fn sync_clear_button(&mut self) {
        if let Some(id) = self.clear_button {
            let enabled = !self.disabled && !self.store.value(self.hidden).is_empty();
            self.store.set_disabled(id, !enabled);
        }
    }

    pub fn form_entries(&self) -> Vec<(&str, &str)> {
        self.store.form_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ValueModel {
        ValueModel::new(
            ControlFields::new("fruit_id")
                .with_hidden_text("fruit_label")
                .with_clear_button(),
        )
    }

    #[test]
    fn commit_updates_all_fields() {
        let mut m = model();
        assert!(m.commit("2", "Banana"));
        assert_eq!(m.display_text(), "Banana");
        assert_eq!(m.canonical(), "2");
        assert_eq!(m.hidden_text(), Some("Banana"));
        assert!(m.clear_button_enabled());
        assert!(!m.commit("2", "Banana"));
    }

    #[test]
    fn value_rule() {
        let mut m = model();
        m.commit("2", "Banana");
        assert_eq!(m.value(false), "2");
        assert_eq!(m.value(true), "2");

        let input = m.input_id();
        m.store_mut().set(input, "Bananas");
        assert_eq!(m.value(false), "2");
        assert_eq!(m.value(true), "Bananas");
    }

    #[test]
    fn free_text_without_commit_reads_display_text() {
        let mut m = model();
        let input = m.input_id();
        m.store_mut().set(input, "Kiwi");
        assert_eq!(m.value(true), "Kiwi");
        assert_eq!(m.value(false), "");
    }

    #[test]
    fn invalidate_mirrors_label() {
        let mut m = model();
        m.commit("2", "Banana");
        let input = m.input_id();
        m.store_mut().set(input, "Ban");
        assert!(m.invalidate_canonical());
        assert_eq!(m.canonical(), "");
        assert_eq!(m.hidden_text(), Some("Ban"));
        assert!(!m.clear_button_enabled());
    }

    #[test]
    fn disabled_propagates_and_drops_form_entries() {
        let mut m = model();
        m.commit("2", "Banana");
        assert_eq!(
            m.form_entries(),
            vec![("fruit_id", "2"), ("fruit_label", "Banana")]
        );

        assert!(m.set_disabled(true));
        assert!(m.store().is_disabled(m.input_id()));
        assert!(m.store().is_disabled(m.hidden_id()));
        assert!(!m.clear_button_enabled());
        assert!(m.form_entries().is_empty());

        m.set_disabled(false);
        assert!(m.clear_button_enabled());
    }
}
