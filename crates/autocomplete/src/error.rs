use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutocompleteError {
    /// Wiring mistake: the control has neither a remote endpoint nor a local list.
    #[error("auto-complete needs a remote url or a local option list before it can query")]
    MissingSource,
    #[error("remote query attempted but no network bus is attached")]
    NoTransport,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Mount(#[from] MountError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("server responded with status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum MountError {
    #[error("no factory registered for controller {0:?}")]
    UnknownController(String),
    #[error("controller {controller:?} is missing its {target:?} target")]
    MissingTarget {
        controller: String,
        target: &'static str,
    },
    #[error("embedded option list is not valid JSON: {0}")]
    OptionList(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
