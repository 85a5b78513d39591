use core_types::{ControlId, RequestId, ResourceKind};
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    // Network requests
    FetchQuery {
        control_id: ControlId,
        request_id: RequestId,
        url: String,
    },
    CancelRequest {
        control_id: ControlId,
        request_id: RequestId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    // Network -> UI
    QueryLoaded {
        control_id: ControlId,
        request_id: RequestId,
        kind: ResourceKind,
        url: String,
        status: u16,
        body: String,
    },
    QueryFailed {
        control_id: ControlId,
        request_id: RequestId,
        kind: ResourceKind,
        url: String,
        error: String,
    },
}

impl CoreEvent {
    pub fn control_id(&self) -> ControlId {
        match self {
            CoreEvent::QueryLoaded { control_id, .. } | CoreEvent::QueryFailed { control_id, .. } => {
                *control_id
            }
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            CoreEvent::QueryLoaded { request_id, .. } | CoreEvent::QueryFailed { request_id, .. } => {
                *request_id
            }
        }
    }
}

pub struct Bus {
    pub cmd_tx: Sender<CoreCommand>,
    pub evt_rx: Receiver<CoreEvent>,
    pub evt_tx: Sender<CoreEvent>, // shareable for runtimes
}

impl Bus {
    /// Creates the channel pair; the returned receiver belongs to the network runtime.
    pub fn new() -> (Self, Receiver<CoreCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        (
            Self {
                cmd_tx,
                evt_rx,
                evt_tx,
            },
            cmd_rx,
        )
    }
}
