use serde::{Deserialize, Deserializer, Serialize};

/// A candidate a user can pick: canonical value, display label, and whatever
/// extra data the host attached to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub text: String,
    #[serde(default = "enabled_by_default", skip_serializing_if = "is_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl OptionItem {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            enabled: true,
            metadata: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

fn enabled_by_default() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

// Option lists embedded in pages often carry numeric ids.
fn scalar_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    use serde_json::Value;
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a string or number, got {other}"
            )));
        }
    })
}

/// Ordered candidates, unique by value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionList {
    items: Vec<OptionItem>,
}

impl OptionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of `{value, text, enabled?, metadata?}` objects.
    /// Blank input is an empty list. Later duplicates of a value are dropped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::new());
        }
        let items: Vec<OptionItem> = serde_json::from_str(json)?;
        Ok(items.into_iter().collect())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[OptionItem] {
        &self.items
    }

    /// Appends unless an item with the same value exists. Returns `true` if added.
    pub fn push(&mut self, item: OptionItem) -> bool {
        if self.items.iter().any(|o| o.value == item.value) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn find_by_value(&self, value: &str) -> Option<&OptionItem> {
        self.items.iter().find(|o| o.value == value)
    }

    pub fn find_enabled_by_value(&self, value: &str) -> Option<&OptionItem> {
        self.items.iter().find(|o| o.enabled && o.value == value)
    }

    /// Exact label match, ignoring surrounding whitespace.
    pub fn find_enabled_by_text(&self, text: &str) -> Option<&OptionItem> {
        let text = text.trim();
        self.items.iter().find(|o| o.enabled && o.text.trim() == text)
    }
}

impl FromIterator<OptionItem> for OptionList {
    fn from_iter<I: IntoIterator<Item = OptionItem>>(iter: I) -> Self {
        let mut list = OptionList::new();
        for item in iter {
            list.push(item);
        }
        list
    }
}

impl<'a> IntoIterator for &'a OptionList {
    type Item = &'a OptionItem;
    type IntoIter = std::slice::Iter<'a, OptionItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
