pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod query;
pub mod runner;
pub mod summarize;
pub mod transport;

pub use config::{HostConfig, ProducerOptions};
pub use error::{ProducerError, Result};
pub use models::{
    EmittedEvent, EventOverrides, EventState, EventTemplate, QuerySpec, RequestDescriptor,
    SampleOutcome,
};
pub use producer::{GraphiteProducer, Producer};
pub use transport::{HttpTransport, Transport};
