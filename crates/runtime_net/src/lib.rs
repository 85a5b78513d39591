use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, Sender},
};
use std::thread;

use bus::{CoreCommand, CoreEvent};
use core_types::{ControlId, RequestId, ResourceKind};
use net::{FetchResult, fetch_text};

type RequestKey = (ControlId, RequestId);

pub fn start_net_runtime(cmd_rx: Receiver<CoreCommand>, evt_tx: Sender<CoreEvent>) {
    thread::spawn(move || {
        // one cancel flag per in-flight query
        let mut cancels: HashMap<RequestKey, Arc<AtomicBool>> = HashMap::new();

        while let Ok(cmd) = cmd_rx.recv() {
            // Finished fetch threads drop their clone of the flag.
            cancels.retain(|_, flag| Arc::strong_count(flag) > 1);

            match cmd {
                CoreCommand::FetchQuery {
                    control_id,
                    request_id,
                    url,
                } => {
                    let cancel = cancels
                        .entry((control_id, request_id))
                        .or_insert_with(|| Arc::new(AtomicBool::new(false)))
                        .clone();

                    log::debug!(target: "runtime_net", "control {control_id}: fetching {url} (request {request_id})");
                    let evt_tx = evt_tx.clone();
                    fetch_text(
                        request_id,
                        url,
                        cancel,
                        Arc::new(move |request_id, result: FetchResult| {
                            let _ = evt_tx.send(to_core_event(control_id, request_id, result));
                        }),
                    );
                }

                CoreCommand::CancelRequest {
                    control_id,
                    request_id,
                } => {
                    if let Some(flag) = cancels.remove(&(control_id, request_id)) {
                        flag.store(true, Ordering::Release);
                    }
                }
            }
        }
        log::debug!(target: "runtime_net", "command channel closed; network runtime exiting");
    });
}

fn to_core_event(control_id: ControlId, request_id: RequestId, result: FetchResult) -> CoreEvent {
    let kind = ResourceKind::QueryRows;
    match (result.error, result.status) {
        (None, Some(status)) => CoreEvent::QueryLoaded {
            control_id,
            request_id,
            kind,
            url: result.url,
            status,
            body: result.body,
        },
        (error, _) => CoreEvent::QueryFailed {
            control_id,
            request_id,
            kind,
            url: result.requested_url,
            error: error.unwrap_or_else(|| "no response status".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_result(status: Option<u16>, error: Option<&str>) -> FetchResult {
        FetchResult {
            url: "https://members.test/search?q=an".into(),
            requested_url: "https://members.test/search?q=an".into(),
            status,
            body: "<li role=\"option\">Ann</li>".into(),
            content_type: Some("text/html".into()),
            duration_ms: 3,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn responses_with_status_become_loaded_events() {
        let event = to_core_event(4, 9, fetch_result(Some(500), None));
        assert!(matches!(
            event,
            CoreEvent::QueryLoaded { control_id: 4, request_id: 9, status: 500, .. }
        ));
    }

    #[test]
    fn transport_failures_become_failed_events() {
        let event = to_core_event(4, 9, fetch_result(None, Some("dns failure")));
        match event {
            CoreEvent::QueryFailed { error, .. } => assert_eq!(error, "dns failure"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
