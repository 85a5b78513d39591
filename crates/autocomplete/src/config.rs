use std::time::Duration;

use markup::Node;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_QUERY_PARAM: &str = "q";

/// What a blur does while a remote query is still outstanding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlurWhileSearching {
    /// Resolve the typed text like any other mid-interaction blur.
    #[default]
    CommitText,
    /// Drop both display text and canonical value.
    Clear,
}

/// Value/label pair applied once at mount.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InitialSelection {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    /// Remote endpoint. Relative values resolve against `document_url`.
    pub url: Option<String>,
    pub query_param: String,
    #[serde(alias = "minLength")]
    pub min_query_length: usize,
    #[serde(alias = "delay")]
    pub debounce_ms: u64,
    #[serde(alias = "allowOther")]
    pub allow_other_values: bool,
    #[serde(alias = "submitOnEnter")]
    pub submit_on_enter: bool,
    #[serde(alias = "initSelection")]
    pub init_selection: Option<InitialSelection>,
    #[serde(alias = "blurWhileSearching")]
    pub blur_while_searching: BlurWhileSearching,
    #[serde(skip)]
    pub document_url: Option<Url>,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            url: None,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            min_query_length: 0,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            allow_other_values: false,
            submit_on_enter: false,
            init_selection: None,
            blur_while_searching: BlurWhileSearching::default(),
            document_url: None,
        }
    }
}

impl AutocompleteConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_document_url(mut self, url: Url) -> Self {
        self.document_url = Some(url);
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Absolute endpoint, or `None` when no remote url is configured.
    pub fn endpoint(&self) -> Result<Option<Url>, ConfigError> {
        let Some(raw) = self.url.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let parsed = match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.document_url {
                Some(base) => base.join(raw),
                None => Err(url::ParseError::RelativeUrlWithoutBase),
            },
            Err(e) => Err(e),
        };
        parsed.map(Some).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read `data-<controller>-<key>-value` attributes off a mount element.
    ///
    /// Unknown keys are ignored. Booleans accept `""`, `"true"` and `"false"`.
    pub fn from_dataset(controller: &str, element: &Node) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let Node::Element { attributes, .. } = element else {
            return Ok(config);
        };
        let prefix = format!("data-{controller}-");

        for (name, value) in attributes {
            let Some(key) = name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix("-value"))
            else {
                continue;
            };
            let value = value.as_deref().unwrap_or("");
            config.apply(key, value)?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "url" => self.url = Some(value.to_string()),
            "query-param" => {
                if value.is_empty() {
                    return Err(invalid(key, value));
                }
                self.query_param = value.to_string();
            }
            "min-length" | "min-query-length" => self.min_query_length = parse_number(key, value)?,
            "delay" | "debounce-ms" => self.debounce_ms = parse_number(key, value)?,
            "allow-other" | "allow-other-values" => self.allow_other_values = parse_bool(key, value)?,
            "submit-on-enter" => self.submit_on_enter = parse_bool(key, value)?,
            "init-selection" => {
                let selection: InitialSelection =
                    serde_json::from_str(value).map_err(|_| invalid(key, value))?;
                self.init_selection = Some(selection);
            }
            "blur-while-searching" => {
                self.blur_while_searching = match value {
                    "commit-text" => BlurWhileSearching::CommitText,
                    "clear" => BlurWhileSearching::Clear,
                    _ => return Err(invalid(key, value)),
                }
            }
            _ => log::trace!(target: "autocomplete", "ignoring unknown value attribute {key}"),
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount(attrs: &[(&str, &str)]) -> Node {
        Node::element("div", attrs, Vec::new())
    }

    #[test]
    fn defaults() {
        let c = AutocompleteConfig::default();
        assert_eq!(c.query_param, "q");
        assert_eq!(c.debounce(), Duration::from_millis(300));
        assert_eq!(c.min_query_length, 0);
        assert!(!c.allow_other_values);
        assert_eq!(c.blur_while_searching, BlurWhileSearching::CommitText);
        assert_eq!(c.endpoint().unwrap(), None);
    }

    #[test]
    fn reads_dataset_values() {
        let el = mount(&[
            ("data-controller", "autocomplete"),
            ("data-autocomplete-url-value", "https://example.test/search"),
            ("data-autocomplete-min-length-value", "2"),
            ("data-autocomplete-delay-value", "150"),
            ("data-autocomplete-allow-other-value", ""),
            ("data-autocomplete-submit-on-enter-value", "false"),
            ("data-autocomplete-query-param-value", "term"),
            ("data-autocomplete-blur-while-searching-value", "clear"),
        ]);
        let c = AutocompleteConfig::from_dataset("autocomplete", &el).unwrap();
        assert_eq!(c.url.as_deref(), Some("https://example.test/search"));
        assert_eq!(c.min_query_length, 2);
        assert_eq!(c.debounce_ms, 150);
        assert!(c.allow_other_values);
        assert!(!c.submit_on_enter);
        assert_eq!(c.query_param, "term");
        assert_eq!(c.blur_while_searching, BlurWhileSearching::Clear);
    }

    #[test]
    fn dataset_ignores_other_controllers() {
        let el = mount(&[("data-other-min-length-value", "nope")]);
        let c = AutocompleteConfig::from_dataset("autocomplete", &el).unwrap();
        assert_eq!(c.min_query_length, 0);
    }

    #[test]
    fn rejects_malformed_values() {
        let el = mount(&[("data-ac-min-length-value", "two")]);
        let err = AutocompleteConfig::from_dataset("ac", &el).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "min-length".into(),
                value: "two".into()
            }
        );

        let el = mount(&[("data-ac-submit-on-enter-value", "yes")]);
        assert!(AutocompleteConfig::from_dataset("ac", &el).is_err());
    }

    #[test]
    fn init_selection_json() {
        let el = mount(&[(
            "data-ac-init-selection-value",
            r#"{"value":"2","text":"Banana"}"#,
        )]);
        let c = AutocompleteConfig::from_dataset("ac", &el).unwrap();
        assert_eq!(
            c.init_selection,
            Some(InitialSelection {
                value: "2".into(),
                text: "Banana".into()
            })
        );
    }

    #[test]
    fn relative_endpoint_needs_document_url() {
        let c = AutocompleteConfig::default().with_url("/fruits/search");
        assert!(matches!(c.endpoint(), Err(ConfigError::InvalidUrl { .. })));

        let base = Url::parse("https://shop.test/orders/new").unwrap();
        let c = c.with_document_url(base);
        assert_eq!(
            c.endpoint().unwrap().unwrap().as_str(),
            "https://shop.test/fruits/search"
        );
    }

    #[test]
    fn deserializes_with_aliases() {
        let c: AutocompleteConfig =
            serde_json::from_str(r#"{"minLength": 3, "delay": 50, "allowOther": true}"#).unwrap();
        assert_eq!(c.min_query_length, 3);
        assert_eq!(c.debounce_ms, 50);
        assert!(c.allow_other_values);
        assert_eq!(c.query_param, "q");
    }
}
