//! Accessible typeahead/combobox engine.
//!
//! A control binds a visible text input, a hidden canonical value and a
//! results popup. Typing schedules a debounced query against either an
//! embedded option list or a remote endpoint; responses fill the popup, and
//! picking a row commits its value and label together. Only the most recent
//! remote query may affect state.
//!
//! The engine is single-threaded and clock-free: hosts feed [`UiEvent`]s with
//! the current [`std::time::Instant`], call `poll` when
//! `next_deadline` passes, and forward network [`bus::CoreEvent`]s back in.

mod binding;
mod config;
mod controller;
mod debounce;
mod error;
mod handle;
mod host;
mod mount;
mod option;
mod popup;
mod signals;
mod source;
mod value;


pub use binding::{EventOutcome, Key, UiEvent};
pub use config::{
    AutocompleteConfig, BlurWhileSearching, DEFAULT_DEBOUNCE_MS, DEFAULT_QUERY_PARAM,
    InitialSelection,
};
pub use controller::Autocomplete;
pub use debounce::Debouncer;
pub use error::{AutocompleteError, ConfigError, MountError, TransportError};
pub use handle::AutocompleteHandle;
pub use host::{
    ControllerFactories, ControllerFactory, ControllerHost, DetachedElement, HostElement,
    MountContext, MountedController,
};
pub use mount::{MountPoint, autocomplete_factory, build_autocomplete};
pub use option::{OptionItem, OptionList};
pub use popup::{Direction, Phase, Popup, PopupContent, ResultRow};
pub use signals::{AutocompleteEvent, Listener, PopupTargets, Signals, SubscriptionId};
pub use source::{OptionSource, RemoteEndpoint, filter_local, match_ranges, parse_rows};
pub use value::{ControlFields, ValueInput, ValueModel};
