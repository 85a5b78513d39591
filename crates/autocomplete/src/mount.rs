//! Mount points described by markup, and the autocomplete factory.
//!
//! A mount element names its controller in `data-controller`; its parts are
//! descendants tagged `data-<controller>-target="<name>"`, and its settings
//! are `data-<controller>-<key>-value` attributes.

use std::time::Instant;

use bus::CoreEvent;
use core_types::ControlId;
use input_core::{FieldSpec, FieldStore};
use markup::{Descendants, Node};

use crate::config::AutocompleteConfig;
use crate::controller::Autocomplete;
use crate::error::{AutocompleteError, MountError};
use crate::handle::AutocompleteHandle;
use crate::host::{DetachedElement, MountContext, MountedController};
use crate::option::OptionList;
use crate::value::ControlFields;

#[derive(Clone, Debug)]
pub struct MountPoint<'a> {
    controller: String,
    element: &'a Node,
}

impl<'a> MountPoint<'a> {
    pub fn new(controller: impl Into<String>, element: &'a Node) -> Self {
        Self {
            controller: controller.into(),
            element,
        }
    }

    /// Every `(controller, element)` pair under `roots`, in document order.
    /// An element listing several controllers yields one point per name.
    pub fn scan(roots: &'a [Node]) -> Vec<MountPoint<'a>> {
        Descendants::new(roots)
            .filter_map(|node| node.attr("data-controller").map(|names| (node, names)))
            .flat_map(|(node, names)| {
                names
                    .split_whitespace()
                    .map(move |name| MountPoint::new(name, node))
            })
            .collect()
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn element(&self) -> &'a Node {
        self.element
    }

    pub fn targets<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'a Node> + 's {
        let attr = format!("data-{}-target", self.controller);
        self.element.descendants().filter(move |node| {
            node.attr(&attr)
                .is_some_and(|targets| targets.split_whitespace().any(|t| t == name))
        })
    }

    pub fn target(&self, name: &str) -> Option<&'a Node> {
        self.targets(name).next()
    }

    pub fn value(&self, key: &str) -> Option<&'a str> {
        self.element
            .attr(&format!("data-{}-{key}-value", self.controller))
    }
}

fn field_spec(node: &Node) -> FieldSpec {
    FieldSpec {
        name: node.attr("name").map(str::to_string),
        value: node.attr("value").unwrap_or("").to_string(),
        disabled: node.has_attr("disabled"),
    }
}

/// Build an autocomplete from its mount point. The control is not mounted yet.
///
/// Required targets: `input`, `hidden`, `results`. Optional: `hiddenText`,
/// `clearButton`, and `dataList` holding a JSON option list.
pub fn build_autocomplete(ctx: &MountContext<'_>) -> Result<AutocompleteHandle, MountError> {
    let point = ctx.point;
    let missing = |target: &'static str| MountError::MissingTarget {
        controller: point.controller().to_string(),
        target,
    };

    let mut config = AutocompleteConfig::from_dataset(point.controller(), point.element())?;
    config.document_url = ctx.document_url.cloned();

    let input = point.target("input").ok_or_else(|| missing("input"))?;
    let hidden = point.target("hidden").ok_or_else(|| missing("hidden"))?;
    let results = point.target("results").ok_or_else(|| missing("results"))?;

    let mut store = FieldStore::new();
    let input = store.register(field_spec(input));
    let hidden = store.register(field_spec(hidden));
    let hidden_text = point
        .target("hiddenText")
        .map(|node| store.register(field_spec(node)));
    let clear_button = point.target("clearButton").map(|node| {
        store.register(FieldSpec {
            disabled: node.has_attr("disabled"),
            ..FieldSpec::default()
        })
    });
    let options = point
        .target("dataList")
        .map(|node| OptionList::from_json(&node.text_content()))
        .transpose()?;

    let fields = ControlFields {
        store,
        input,
        hidden,
        hidden_text,
        clear_button,
    };
    let hidden_host = point.element().has_attr("hidden");
    let mut control = Autocomplete::new(ctx.control_id, config, fields, options)?
        .with_results_id(results.attr("id").unwrap_or(""))
        .with_host(Box::new(DetachedElement::new(hidden_host)));
    if let Some(tx) = ctx.cmd_tx {
        control.set_bus_sender(tx.clone());
    }
    if hidden_host {
        control.set_hidden(true);
    }
    Ok(AutocompleteHandle::new(control))
}

/// Factory to register under the autocomplete controller's name.
pub fn autocomplete_factory()
-> impl Fn(&MountContext<'_>) -> Result<Box<dyn MountedController>, MountError> + 'static {
    |ctx: &MountContext<'_>| {
        let handle = build_autocomplete(ctx)?;
        Ok(Box::new(MountedAutocomplete {
            name: ctx.point.controller().to_string(),
            handle,
        }) as Box<dyn MountedController>)
    }
}

struct MountedAutocomplete {
    name: String,
    handle: AutocompleteHandle,
}

impl MountedController for MountedAutocomplete {
    fn name(&self) -> &str {
        &self.name
    }

    fn control_id(&self) -> ControlId {
        self.handle.control_id()
    }

    fn mount(&self) {
        self.handle.mount();
    }

    fn unmount(&self) {
        self.handle.unmount();
    }

    fn on_core_event(&self, evt: CoreEvent) -> Result<(), AutocompleteError> {
        self.handle.on_core_event(evt)
    }

    fn poll(&self, now: Instant) -> Result<(), AutocompleteError> {
        self.handle.poll(now)
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.handle.next_deadline()
    }

    fn as_autocomplete(&self) -> Option<&AutocompleteHandle> {
        Some(&self.handle)
    }
}
