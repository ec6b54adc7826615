use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{ProducerError, Result};

/// Where the Graphite webapp lives. Cloned for every cycle, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_render_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_render_path() -> String {
    "/render".to_string()
}

impl RequestDescriptor {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            path: default_render_path(),
            secure: false,
            timeout_ms: None,
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.secure { 443 } else { 80 })
    }

    /// Full URL for the current `path`, which is expected to already carry the query string.
    pub fn url(&self) -> String {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!(
            "{}://{}:{}{}",
            self.scheme(),
            host,
            self.effective_port(),
            self.path
        )
    }
}

/// Which series to fetch and over what window. `from`/`until` are passed to Graphite as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub targets: Vec<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
    /// Keep only the last N valid datapoints of every series.
    #[serde(default)]
    pub max_datapoints: Option<usize>,
}

impl QuerySpec {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            from: None,
            until: None,
            max_datapoints: None,
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    pub fn with_max_datapoints(mut self, max: usize) -> Self {
        self.max_datapoints = Some(max);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(ProducerError::Configuration(
                "graphite.targets must contain at least one target".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    #[default]
    Ok,
    Warning,
    Critical,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Ok => "ok",
            EventState::Warning => "warning",
            EventState::Critical => "critical",
        }
    }
}

/// Static defaults every emitted event starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTemplate {
    pub host: String,
    pub service: String,
    pub state: EventState,
    pub tags: Vec<String>,
    pub metric: f64,
    pub ttl: Option<u64>,
}

impl Default for EventTemplate {
    fn default() -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            host,
            service: "graphite".to_string(),
            state: EventState::Ok,
            tags: Vec::new(),
            metric: 1.0,
            ttl: None,
        }
    }
}

/// Per-cycle event fields that win over the template when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventOverrides {
    pub host: Option<String>,
    pub service: Option<String>,
    pub state: Option<EventState>,
    pub tags: Option<Vec<String>>,
    pub metric: Option<f64>,
    pub ttl: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedEvent {
    pub host: String,
    pub service: String,
    pub state: EventState,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
    pub description: String,
    pub tags: Vec<String>,
    pub metric: f64,
    pub ttl: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Success { aggregate: f64 },
    Failure { reason: String, is_transport_error: bool },
}

impl From<ProducerError> for SampleOutcome {
    fn from(err: ProducerError) -> Self {
        SampleOutcome::Failure {
            is_transport_error: err.is_transport_error(),
            reason: err.to_string(),
        }
    }
}

/// One element of the render API's JSON array.
#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    #[serde(default, deserialize_with = "null_as_default")]
    pub target: String,
    /// Kept as raw values so a malformed pair only invalidates itself.
    #[serde(default, deserialize_with = "null_as_default")]
    pub datapoints: Vec<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
