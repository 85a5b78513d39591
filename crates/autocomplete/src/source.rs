//! Where candidate rows come from: the embedded list or a remote endpoint.

use std::ops::Range;

use markup::{Descendants, Node};
use url::Url;

use crate::config::AutocompleteConfig;
use crate::error::{ConfigError, TransportError};
use crate::option::{OptionItem, OptionList};
use crate::popup::ResultRow;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionSource {
    Remote(RemoteEndpoint),
    Local,
    /// Neither an endpoint nor a list was wired up; queries fail.
    Unconfigured,
}

impl OptionSource {
    /// Remote wins when an endpoint is configured, then the local list.
    pub fn select(config: &AutocompleteConfig, has_local: bool) -> Result<Self, ConfigError> {
        match config.endpoint()? {
            Some(base) => Ok(OptionSource::Remote(RemoteEndpoint {
                base,
                query_param: config.query_param.clone(),
            })),
            None if has_local => Ok(OptionSource::Local),
            None => Ok(OptionSource::Unconfigured),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, OptionSource::Remote(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteEndpoint {
    base: Url,
    query_param: String,
}

impl RemoteEndpoint {
    pub fn new(base: Url, query_param: impl Into<String>) -> Self {
        Self {
            base,
            query_param: query_param.into(),
        }
    }

    /// Endpoint with the query appended, keeping any parameters already present.
    pub fn query_url(&self, query: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair(&self.query_param, query);
        url
    }
}

/// Lazily filter the local list.
///
/// A blank query lists everything, disabled items included (they render but
/// cannot be picked). Otherwise only enabled items whose label contains the
/// query, ignoring case, are yielded, with the matches marked.
pub fn filter_local<'a>(
    options: &'a OptionList,
    query: &'a str,
) -> impl Iterator<Item = ResultRow> + 'a {
    let query = query.trim();
    options.iter().filter_map(move |item| {
        if query.is_empty() {
            return Some(row_from_item(item, Vec::new()));
        }
        if !item.enabled {
            return None;
        }
        let highlights = match_ranges(&item.text, query);
        (!highlights.is_empty()).then(|| row_from_item(item, highlights))
    })
}

fn row_from_item(item: &OptionItem, highlights: Vec<Range<usize>>) -> ResultRow {
    ResultRow {
        id: String::new(),
        value: item.value.clone(),
        label: item.text.clone(),
        disabled: !item.enabled,
        href: None,
        highlights,
    }
}

/// Non-overlapping, case-insensitive occurrences of `needle` in `haystack`.
pub fn match_ranges(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    if needle.is_empty() {
        return out;
    }
    let mut start = 0;
    while start < haystack.len() {
        match match_at(&haystack[start..], needle) {
            Some(len) => {
                out.push(start..start + len);
                start += len;
            }
            None => {
                start += haystack[start..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    out
}

// Byte length of the prefix of `hay` matching `needle` ignoring case.
fn match_at(hay: &str, needle: &str) -> Option<usize> {
    let mut hay_chars = hay.char_indices();
    for n in needle.chars() {
        let (_, h) = hay_chars.next()?;
        if !h.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
    }
    Some(hay_chars.next().map_or(hay.len(), |(i, _)| i))
}

/// Turn a finished remote response into rows, or the error a caller sees.
pub fn rows_from_response(url: &str, status: u16, body: &str) -> Result<Vec<ResultRow>, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(parse_rows(body))
}

/// Rows are the elements marked `role="option"` in a server-rendered fragment.
///
/// `data-ac-value` carries the canonical value (falling back to the label),
/// `data-ac-label` overrides the visible text, `aria-disabled="true"` marks
/// rows that cannot be picked and `<a href>` rows are links.
pub fn parse_rows(body: &str) -> Vec<ResultRow> {
    let roots = markup::parse_fragment(body);
    Descendants::new(&roots)
        .filter(|n| n.attr("role") == Some("option"))
        .map(row_from_node)
        .collect()
}

fn row_from_node(node: &Node) -> ResultRow {
    let label = match node.attr("data-ac-label") {
        Some(label) => label.trim().to_string(),
        None => node.text_content().trim().to_string(),
    };
    let value = node
        .attr("data-ac-value")
        .map(str::to_string)
        .unwrap_or_else(|| label.clone());
    let href = node
        .is_element("a")
        .then(|| node.attr("href"))
        .flatten()
        .map(str::to_string);

    ResultRow {
        id: node.attr("id").unwrap_or("").to_string(),
        value,
        label,
        disabled: node.attr("aria-disabled") == Some("true"),
        href,
        highlights: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> OptionList {
        [
            OptionItem::new("1", "Apple"),
            OptionItem::new("2", "Banana"),
            OptionItem::new("3", "Pineapple"),
            OptionItem::new("4", "Dragon fruit").disabled(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn local_filter_is_case_insensitive_substring() {
        let list = fruits();
        let rows: Vec<_> = filter_local(&list, "APP").collect();
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Apple", "Pineapple"]);
        assert_eq!(rows[0].highlights, vec![0..3]);
        assert_eq!(rows[1].highlights, vec![4..7]);
    }

    #[test]
    fn blank_query_lists_everything_including_disabled() {
        let list = fruits();
        let rows: Vec<_> = filter_local(&list, "  ").collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[3].disabled);
        assert!(filter_local(&list, "dragon").next().is_none());
    }

    #[test]
    fn filter_is_lazy() {
        let list = fruits();
        let mut it = filter_local(&list, "a");
        assert_eq!(it.next().map(|r| r.value), Some("1".to_string()));
    }

    #[test]
    fn match_ranges_handles_multibyte() {
        assert_eq!(match_ranges("Crème brûlée", "BRÛ"), vec![7..11]);
        assert_eq!(match_ranges("banana", "an"), vec![1..3, 3..5]);
        assert!(match_ranges("kiwi", "").is_empty());
        assert!(match_ranges("ki", "kiwi").is_empty());
    }

    #[test]
    fn parses_remote_rows() {
        let body = r#"
            <ul>
              <li role="option" data-ac-value="1">Apple</li>
              <li role="option" id="row-b" aria-disabled="true">  Banana </li>
              <li role="option" data-ac-value="3" data-ac-label="Cherry"><b>Cher</b>ry (red)</li>
              <li class="header">Links</li>
              <a role="option" href="/fruits/new">Add a fruit</a>
            </ul>"#;
        let rows = parse_rows(body);
        assert_eq!(rows.len(), 4);
        assert_eq!((rows[0].value.as_str(), rows[0].label.as_str()), ("1", "Apple"));
        assert_eq!(rows[1].id, "row-b");
        assert_eq!(rows[1].value, "Banana");
        assert!(rows[1].disabled);
        assert_eq!(rows[2].label, "Cherry");
        assert_eq!(rows[3].href.as_deref(), Some("/fruits/new"));
    }

    #[test]
    fn non_success_status_is_error() {
        let err = rows_from_response("https://x.test/?q=a", 500, "oops").unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                url: "https://x.test/?q=a".into(),
                status: 500
            }
        );
        assert!(rows_from_response("u", 200, "").unwrap().is_empty());
    }

    #[test]
    fn query_url_appends_param() {
        let endpoint = RemoteEndpoint::new(
            Url::parse("https://shop.test/search?scope=fruit").unwrap(),
            "q",
        );
        assert_eq!(
            endpoint.query_url("pine apple").as_str(),
            "https://shop.test/search?scope=fruit&q=pine+apple"
        );
    }

    #[test]
    fn source_selection() {
        let remote = AutocompleteConfig::default().with_url("https://shop.test/search");
        assert!(OptionSource::select(&remote, true).unwrap().is_remote());
        let local = AutocompleteConfig::default();
        assert_eq!(OptionSource::select(&local, true).unwrap(), OptionSource::Local);
        assert_eq!(
            OptionSource::select(&local, false).unwrap(),
            OptionSource::Unconfigured
        );
    }
}
