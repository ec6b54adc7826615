use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    models::{EventOverrides, EventTemplate, QuerySpec, RequestDescriptor},
    ProducerError, Result,
};

/// Construction options of a graphite producer, usually read from a JSON file.
///
/// ```json
/// {
///   "event":    { "service": "load/avg" },
///   "request":  { "host": "graphite.local", "port": 8080, "path": "/render" },
///   "graphite": { "targets": ["servers.web1.load"], "from": "-5min" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProducerOptions {
    pub event: Option<EventOverrides>,
    pub request: Option<RequestDescriptor>,
    pub graphite: Option<QuerySpec>,
    #[serde(default)]
    pub defaults: Option<EventTemplate>,
}

/// Validated form of [`ProducerOptions`].
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub template: EventTemplate,
    pub overrides: EventOverrides,
    pub request: RequestDescriptor,
    pub query: QuerySpec,
}

impl ProducerOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ProducerError::Configuration(format!("invalid producer options: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProducerError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    pub fn validate(self) -> Result<ProducerConfig> {
        let (overrides, request, query) = match (self.event, self.request, self.graphite) {
            (Some(event), Some(request), Some(graphite)) => (event, request, graphite),
            _ => {
                return Err(ProducerError::Configuration(
                    "options.event, options.request and options.graphite are required".to_string(),
                ))
            }
        };
        query.validate()?;

        Ok(ProducerConfig {
            template: self.defaults.unwrap_or_default(),
            overrides,
            request,
            query,
        })
    }
}

/// Process-level settings of the binary, taken from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub config_path: PathBuf,
    pub interval: Duration,
    pub port: u16,
}

impl HostConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = lookup("GRAPHITE_PRODUCER_CONFIG")
            .unwrap_or_else(|| "graphite-producer.json".to_string())
            .into();

        let interval_secs: u64 = match lookup("PRODUCE_INTERVAL_SECS") {
            Some(value) => value.parse().map_err(|e| {
                ProducerError::Configuration(format!("invalid PRODUCE_INTERVAL_SECS {}: {}", value, e))
            })?,
            None => 60,
        };
        if interval_secs == 0 {
            return Err(ProducerError::Configuration(
                "PRODUCE_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|e| ProducerError::Configuration(format!("invalid PORT {}: {}", value, e)))?,
            None => 9090,
        };

        Ok(Self {
            config_path,
            interval: Duration::from_secs(interval_secs),
            port,
        })
    }
}
