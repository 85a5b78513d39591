use core_types::RequestId;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

const MAX_BODY_BYTES: u64 = 256 * 1024;
const USER_AGENT: &str = "typeahead/0.1";
const QUERY_ACCEPT: &str = "text/html, application/json;q=0.9";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResult {
    pub url: String,           // final URL after redirects
    pub requested_url: String, // what we asked for
    pub status: Option<u16>,
    pub body: String,
    pub content_type: Option<String>,
    pub duration_ms: u128,
    pub error: Option<String>,
}

impl FetchResult {
    fn failed(requested_url: &str, error: String, start: Instant) -> Self {
        Self {
            url: requested_url.to_string(),
            requested_url: requested_url.to_string(),
            status: None,
            body: String::new(),
            content_type: None,
            duration_ms: start.elapsed().as_millis(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && matches!(self.status, Some(200..=299))
    }
}

pub type FetchCallback = Arc<dyn Fn(RequestId, FetchResult) + Send + Sync>;

/// Shared agent; prefers the platform trust store and falls back to ureq's bundled roots.
fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let builder = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT);
        match native_tls_config() {
            Some(config) => builder.tls_config(config).build(),
            None => builder.build(),
        }
    })
}

fn native_tls_config() -> Option<Arc<rustls::ClientConfig>> {
    let native = rustls_native_certs::load_native_certs();
    for err in &native.errors {
        log::warn!(target: "net", "skipping native certificate source: {err}");
    }

    let mut roots = rustls::RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    if ignored > 0 {
        log::debug!(target: "net", "ignored {ignored} unparsable native certificates");
    }
    if added == 0 {
        return None;
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = match rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
    {
        Ok(builder) => builder.with_root_certificates(roots).with_no_client_auth(),
        Err(err) => {
            log::warn!(target: "net", "rustls rejected default protocol versions: {err}");
            return None;
        }
    };
    Some(Arc::new(config))
}

/// GET `url` on a worker thread and hand the result to `cb`.
///
/// Non-2xx answers still produce a `FetchResult` carrying the status and body;
/// `error` is only set for transport failures. If `cancel` is raised before the
/// response is read, the callback is never invoked.
pub fn fetch_text(
    request_id: RequestId,
    url: String,
    cancel: Arc<AtomicBool>,
    cb: FetchCallback,
) {
    thread::spawn(move || {
        let start = Instant::now();
        let request = agent()
            .get(&url)
            .set("X-Requested-With", "XMLHttpRequest")
            .set("Accept", QUERY_ACCEPT);

        let result = match request.call() {
            Ok(resp) | Err(ureq::Error::Status(_, resp)) => read_response(&url, resp, start),
            Err(ureq::Error::Transport(err)) => FetchResult::failed(&url, err.to_string(), start),
        };

        if cancel.load(Ordering::Acquire) {
            log::debug!(target: "net", "request {request_id} cancelled; dropping response for {url}");
            return;
        }
        cb(request_id, result);
    });
}

fn read_response(requested_url: &str, resp: ureq::Response, start: Instant) -> FetchResult {
    let status = resp.status();
    let url = resp.get_url().to_string();
    let content_type = resp.header("content-type").map(str::to_string);

    let mut buf = Vec::new();
    if let Err(err) = resp
        .into_reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut buf)
    {
        return FetchResult::failed(requested_url, format!("read error: {err}"), start);
    }

    FetchResult {
        url,
        requested_url: requested_url.to_string(),
        status: Some(status),
        body: String::from_utf8_lossy(&buf).into_owned(),
        content_type,
        duration_ms: start.elapsed().as_millis(),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: Option<u16>, error: Option<&str>) -> FetchResult {
        FetchResult {
            url: "https://example.test/q".into(),
            requested_url: "https://example.test/q".into(),
            status,
            body: String::new(),
            content_type: None,
            duration_ms: 0,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn success_requires_2xx_and_no_error() {
        assert!(result(Some(200), None).is_success());
        assert!(result(Some(204), None).is_success());
        assert!(!result(Some(404), None).is_success());
        assert!(!result(Some(500), None).is_success());
        assert!(!result(None, Some("connection refused")).is_success());
    }

    #[test]
    fn failed_result_keeps_requested_url() {
        let failed = FetchResult::failed("http://x.test/", "boom".into(), Instant::now());
        assert_eq!(failed.url, "http://x.test/");
        assert_eq!(failed.status, None);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
