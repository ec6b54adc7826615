use std::sync::Arc;

use graphite_producer::{
    api::status::{self, StatusState},
    logging,
    runner::run_producer,
    GraphiteProducer, HostConfig, ProducerOptions, Result,
};
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("graphite-producer: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    logging::init_logger(env!("CARGO_CRATE_NAME"))?;

    let host = HostConfig::from_env()?;
    let options = ProducerOptions::from_file(&host.config_path)?;
    let producer = Arc::new(GraphiteProducer::new(options)?);
    info!(
        "sampling {} every {:?}",
        producer.request().host,
        host.interval
    );

    // Events go to the log and to the status server; any other sink plugs in here.
    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(run_producer(producer, host.interval, tx));

    let state = StatusState::new();
    let recorder = state.clone();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => info!("event {}", json),
                Err(e) => error!("failed to serialize event: {}", e),
            }
            recorder.record(event);
        }
    });

    status::serve(state, host.port).await
}
