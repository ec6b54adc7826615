use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::{models::EmittedEvent, producer::Producer};

/// Calls `produce` once per tick and forwards every event to `sink`.
///
/// Cycles never overlap. Returns once the receiving side of `sink` is gone.
pub async fn run_producer(
    producer: Arc<dyn Producer>,
    period: Duration,
    sink: mpsc::Sender<EmittedEvent>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let event = producer.produce().await;
        if sink.send(event).await.is_err() {
            info!("event sink closed, stopping producer");
            return;
        }
    }
}
