use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    config::{ProducerConfig, ProducerOptions},
    metrics::{self, SampleTimer},
    models::{
        EmittedEvent, EventOverrides, EventState, EventTemplate, QuerySpec, RequestDescriptor,
        SampleOutcome,
    },
    query::build_path,
    summarize::summarize,
    transport::{HttpTransport, Transport},
    Result,
};

/// What a host pipeline needs from an event source: one event per call.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn produce(&self) -> EmittedEvent;
}

/// Samples a Graphite render endpoint and turns the answer into an event.
#[derive(Debug)]
pub struct GraphiteProducer<T = HttpTransport> {
    template: EventTemplate,
    overrides: EventOverrides,
    request: RequestDescriptor,
    query: QuerySpec,
    transport: T,
}

impl GraphiteProducer<HttpTransport> {
    pub fn new(options: ProducerOptions) -> Result<Self> {
        Self::with_transport(options, HttpTransport::new()?)
    }
}

impl<T: Transport> GraphiteProducer<T> {
    pub fn with_transport(options: ProducerOptions, transport: T) -> Result<Self> {
        let ProducerConfig {
            template,
            overrides,
            request,
            query,
        } = options.validate()?;

        Ok(Self {
            template,
            overrides,
            request,
            query,
            transport,
        })
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn query(&self) -> &QuerySpec {
        &self.query
    }

    /// A fresh copy of the base request with the render query as its path.
    pub fn current_request(&self) -> RequestDescriptor {
        let mut request = self.request.clone();
        request.path = build_path(&request.path, &self.query);
        request
    }

    pub async fn sample(&self, request: &RequestDescriptor) -> SampleOutcome {
        let result = self
            .transport
            .fetch(request)
            .await
            .and_then(|body| summarize(&body, self.query.max_datapoints));

        match result {
            Ok(summary) => {
                debug!(
                    "summarized {} series from {} into {}",
                    summary.series.len(),
                    request.host,
                    summary.total
                );
                SampleOutcome::Success {
                    aggregate: summary.total,
                }
            }
            Err(err) => err.into(),
        }
    }

    /// Runs one full cycle, using `overrides` instead of the configured event fields.
    pub async fn produce_with(&self, overrides: &EventOverrides) -> EmittedEvent {
        let _timer = SampleTimer::new();
        let request = self.current_request();
        debug!("sampling {}", request.url());

        let outcome = self.sample(&request).await;
        let succeeded = matches!(outcome, SampleOutcome::Success { .. });
        let event = assemble_event(&self.template, overrides, outcome);

        metrics::record_sample(event.state);
        if succeeded {
            metrics::record_metric(&event.service, event.metric);
            info!(
                "{} {} is {} metric={}",
                event.host,
                event.service,
                event.state.as_str(),
                event.metric
            );
        } else {
            warn!(
                "{} {} is {}: {}",
                event.host,
                event.service,
                event.state.as_str(),
                event.description
            );
        }

        event
    }
}

#[async_trait]
impl<T: Transport> Producer for GraphiteProducer<T> {
    async fn produce(&self) -> EmittedEvent {
        self.produce_with(&self.overrides).await
    }
}

/// Merges a cycle's outcome into an event. The timestamp is taken here, after the response.
pub fn assemble_event(
    template: &EventTemplate,
    overrides: &EventOverrides,
    outcome: SampleOutcome,
) -> EmittedEvent {
    let mut event = EmittedEvent {
        host: overrides.host.clone().unwrap_or_else(|| template.host.clone()),
        service: overrides.service.clone().unwrap_or_else(|| template.service.clone()),
        state: overrides.state.unwrap_or(template.state),
        time: Utc::now().timestamp_millis(),
        description: String::new(),
        tags: overrides.tags.clone().unwrap_or_else(|| template.tags.clone()),
        metric: overrides.metric.unwrap_or(template.metric),
        ttl: overrides.ttl.or(template.ttl),
    };

    match outcome {
        SampleOutcome::Success { aggregate } => {
            event.metric = aggregate;
        }
        SampleOutcome::Failure {
            reason,
            is_transport_error,
        } => {
            event.state = if is_transport_error {
                EventState::Critical
            } else {
                EventState::Warning
            };
            event.description = reason;
        }
    }

    event
}
