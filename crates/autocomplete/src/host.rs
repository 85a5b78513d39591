//! Mounting controllers into a page and routing work to them.
//!
//! There is no global registry: the page hands a [`ControllerFactories`] map
//! to a [`ControllerHost`], which scans markup for `data-controller` mount
//! points and builds each controller through its factory.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;

use bus::{CoreCommand, CoreEvent};
use core_types::ControlId;
use markup::Node;
use url::Url;

use crate::error::{AutocompleteError, MountError};
use crate::handle::AutocompleteHandle;
use crate::mount::MountPoint;

/// The element a control is mounted on, as far as the control cares.
pub trait HostElement {
    fn is_hidden(&self) -> bool;
    fn set_hidden(&mut self, hidden: bool);
}

/// Host element that only remembers its visibility.
#[derive(Clone, Debug, Default)]
pub struct DetachedElement {
    hidden: bool,
}

impl DetachedElement {
    pub fn new(hidden: bool) -> Self {
        Self { hidden }
    }
}

impl HostElement for DetachedElement {
    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

/// A controller the host drives.
pub trait MountedController {
    fn name(&self) -> &str;
    fn control_id(&self) -> ControlId;
    fn mount(&self);
    fn unmount(&self);
    fn on_core_event(&self, evt: CoreEvent) -> Result<(), AutocompleteError>;
    fn poll(&self, now: Instant) -> Result<(), AutocompleteError>;
    fn next_deadline(&self) -> Option<Instant>;

    fn as_autocomplete(&self) -> Option<&AutocompleteHandle> {
        None
    }
}

/// Everything a factory gets to build one controller.
pub struct MountContext<'a> {
    pub control_id: ControlId,
    pub point: &'a MountPoint<'a>,
    pub document_url: Option<&'a Url>,
    pub cmd_tx: Option<&'a Sender<CoreCommand>>,
}

pub type ControllerFactory =
    Box<dyn Fn(&MountContext<'_>) -> Result<Box<dyn MountedController>, MountError>>;

/// Controller name → factory.
#[derive(Default)]
pub struct ControllerFactories {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerFactories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&MountContext<'_>) -> Result<Box<dyn MountedController>, MountError> + 'static,
    ) -> &mut Self {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn with(
        mut self,
        name: impl Into<String>,
        factory: impl Fn(&MountContext<'_>) -> Result<Box<dyn MountedController>, MountError> + 'static,
    ) -> Self {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&ControllerFactory> {
        self.factories.get(name)
    }
}

impl std::fmt::Debug for ControllerFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ControllerFactories").field("names", &names).finish()
    }
}

pub struct ControllerHost {
    factories: ControllerFactories,
    controllers: Vec<Box<dyn MountedController>>,
    next_id: ControlId,
    document_url: Option<Url>,
    cmd_tx: Option<Sender<CoreCommand>>,
}

impl ControllerHost {
    pub fn new(factories: ControllerFactories) -> Self {
        Self {
            factories,
            controllers: Vec::new(),
            next_id: 0,
            document_url: None,
            cmd_tx: None,
        }
    }

    pub fn with_document_url(mut self, url: Url) -> Self {
        self.document_url = Some(url);
        self
    }

    pub fn set_bus_sender(&mut self, tx: Sender<CoreCommand>) {
        self.cmd_tx = Some(tx);
    }

    /// Mount every controller found under `roots`. A mount point that fails
    /// is reported and skipped; the rest still mount.
    pub fn mount_all(&mut self, roots: &[Node]) -> Vec<MountError> {
        let mut errors = Vec::new();
        for point in MountPoint::scan(roots) {
            let Some(factory) = self.factories.get(point.controller()) else {
                log::debug!(target: "autocomplete", "no factory for controller {:?}", point.controller());
                errors.push(MountError::UnknownController(point.controller().to_string()));
                continue;
            };
            self.next_id += 1;
            let ctx = MountContext {
                control_id: self.next_id,
                point: &point,
                document_url: self.document_url.as_ref(),
                cmd_tx: self.cmd_tx.as_ref(),
            };
            match factory(&ctx) {
                Ok(controller) => {
                    controller.mount();
                    self.controllers.push(controller);
                }
                Err(e) => {
                    log::warn!(target: "autocomplete", "mounting {:?} failed: {e}", point.controller());
                    errors.push(e);
                }
            }
        }
        errors
    }

    pub fn controllers(&self) -> &[Box<dyn MountedController>] {
        &self.controllers
    }

    pub fn autocompletes(&self) -> impl Iterator<Item = &AutocompleteHandle> {
        self.controllers.iter().filter_map(|c| c.as_autocomplete())
    }

    pub fn autocomplete(&self, control_id: ControlId) -> Option<&AutocompleteHandle> {
        self.autocompletes().find(|h| h.control_id() == control_id)
    }

    /// Hand a network event to the control that asked for it.
    pub fn on_core_event(&self, evt: CoreEvent) -> Result<(), AutocompleteError> {
        let target = evt.control_id();
        match self.controllers.iter().find(|c| c.control_id() == target) {
            Some(controller) => controller.on_core_event(evt),
            None => {
                log::debug!(target: "autocomplete", "event for unknown control {target}");
                Ok(())
            }
        }
    }

    /// Drain whatever the network runtime has delivered so far.
    pub fn pump(&self, evt_rx: &Receiver<CoreEvent>) -> Vec<AutocompleteError> {
        evt_rx
            .try_iter()
            .filter_map(|evt| self.on_core_event(evt).err())
            .collect()
    }

    /// Fire due debounce timers.
    pub fn tick(&self, now: Instant) -> Vec<AutocompleteError> {
        self.controllers
            .iter()
            .filter_map(|c| c.poll(now).err())
            .collect()
    }

    /// Earliest instant at which [`ControllerHost::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.controllers.iter().filter_map(|c| c.next_deadline()).min()
    }

    pub fn unmount_all(&mut self) {
        for controller in self.controllers.drain(..) {
            controller.unmount();
        }
    }
}

impl std::fmt::Debug for ControllerHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHost")
            .field("factories", &self.factories)
            .field("controllers", &self.controllers.len())
            .field("document_url", &self.document_url)
            .finish()
    }
}
