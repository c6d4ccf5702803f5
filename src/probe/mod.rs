//! HTTP probe action.
//!
//! The probe is the job payload's action: fetch `http://<host>` with the
//! configured path and query marker, match the response body against the
//! vulnerability signature, and append hits to the result sink. Every
//! failure (DNS, connect, timeout, read) is logged and swallowed here;
//! the worker pool only ever observes that the job completed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::ProbeSettings;
use crate::report::ResultSink;

mod signature;
pub use signature::Signature;

/// Issues probe requests and records signature hits.
pub struct Prober {
    client: reqwest::blocking::Client,
    path: String,
    query_marker: String,
    signature: Signature,
    sink: Arc<ResultSink>,
}

impl Prober {
    pub fn new(settings: &ProbeSettings, sink: Arc<ResultSink>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(settings.user_agent.clone())
            // One connection per probe; targets are all distinct hosts, so
            // keeping connections alive only wastes sockets.
            .pool_max_idle_per_host(0)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            path: settings.path.clone(),
            query_marker: settings.query_marker.clone(),
            signature: Signature::new(&settings.signature)?,
            sink,
        })
    }

    /// Probe one host to completion. Never panics, never returns an error:
    /// outcomes are recorded through the sink and the log only.
    pub fn probe(&self, host: &str) {
        let url = self.build_url(host);
        debug!(%url, "probing");

        let body = match self
            .client
            .get(&url)
            .header(reqwest::header::CONNECTION, "close")
            .send()
            .and_then(|response| response.text())
        {
            Ok(body) => body,
            Err(e) => {
                warn!(host, error = %e, "probe failed");
                return;
            }
        };

        if let Some(evidence) = self.signature.matches(&body) {
            debug!(host, evidence, "signature hit");
            if let Err(e) = self.sink.record(host, &evidence) {
                warn!(host, error = %e, "failed to record result");
            }
        }
    }

    fn build_url(&self, host: &str) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        if self.query_marker.is_empty() {
            format!("http://{host}{path}")
        } else {
            format!("http://{host}{path}?{}", self.query_marker)
        }
    }
}
