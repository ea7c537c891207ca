use url::Url;

use crate::error::TransportError;

/// The three fixed backend endpoints, derived from one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoints {
    pub snapshots: Url,
    pub input: Url,
    pub audio: Url,
}

impl BackendEndpoints {
    pub fn from_base_url(base_url: &str) -> Result<Self, TransportError> {
        let invalid = |message: String| TransportError::Endpoint {
            endpoint: base_url.to_string(),
            message,
        };

        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        let ws_scheme = match base.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(invalid(format!("unsupported scheme {other}"))),
        };

        let mut snapshots = join_segment(&base, "ws");
        snapshots
            .set_scheme(ws_scheme)
            .map_err(|()| invalid(format!("cannot switch scheme to {ws_scheme}")))?;

        Ok(Self {
            snapshots,
            input: join_segment(&base, "input"),
            audio: join_segment(&base, "audio"),
        })
    }
}

fn join_segment(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    let path = base.path().trim_end_matches('/');
    url.set_path(&format!("{path}/{segment}"));
    url.set_query(None);
    url.set_fragment(None);
    url
}
