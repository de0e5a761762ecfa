use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ChildEntry, EntryInfo, EntrySource};
use crate::error::Result;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct PreviewBody {
    preview: String,
}

/// Client for a metadata service exposing `entry`, `listdir` and `preview`
/// endpoints that take a `path` query parameter and answer JSON.
pub struct HttpSource {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .user_agent(&format!("zoomtree/{}", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    fn request(&self, endpoint: &str, path: &str) -> ureq::Request {
        self.agent.get(&self.endpoint_url(endpoint)).query("path", path)
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str, path: &str) -> Result<T> {
        let request = self.request(endpoint, path);
        tracing::trace!(url = request.url(), "GET");
        let body = request.call()?.into_string()?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

impl EntrySource for HttpSource {
    fn stat(&self, path: &str) -> Result<EntryInfo> {
        self.get("entry", path)
    }

    fn list_dir(&self, path: &str) -> Result<Vec<ChildEntry>> {
        self.get("listdir", path)
    }

    fn preview(&self, path: &str) -> Result<String> {
        self.get::<PreviewBody>("preview", path).map(|body| body.preview)
    }
}
