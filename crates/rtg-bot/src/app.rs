//! Event loop driving one `MarketMaker`.

use std::time::Duration;

use rtg_core::EventEnvelope;
use rtg_mm::{MarketMaker, MmError, OrderGateway};
use rtg_telemetry::SessionSummary;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;

/// Main application.
pub struct Application<G: OrderGateway> {
    config: AppConfig,
    engine: MarketMaker<G>,
    handled: u64,
    failed: u64,
}

impl<G: OrderGateway> Application<G> {
    pub fn new(config: AppConfig, gateway: G) -> AppResult<Self> {
        config.validate()?;
        let engine = MarketMaker::new(config.maker.clone(), gateway)?;
        Ok(Self {
            config,
            engine,
            handled: 0,
            failed: 0,
        })
    }

    /// Handle one event. Engine errors are logged, never propagated.
    pub fn process(&mut self, envelope: &EventEnvelope) {
        self.handled += 1;
        match self.engine.handle(envelope) {
            Ok(()) => {}
            Err(e @ MmError::StaleSequence { .. }) => {
                debug!(ts_ms = envelope.ts_ms, error = %e, "Duplicate market data ignored");
            }
            Err(e) => {
                self.failed += 1;
                warn!(
                    ts_ms = envelope.ts_ms,
                    kind = envelope.event.kind(),
                    error = %e,
                    "Event handling error"
                );
            }
        }
    }

    /// Consume events until the channel closes or Ctrl-C.
    pub async fn run(mut self, mut events: mpsc::Receiver<EventEnvelope>) -> AppResult<SessionSummary> {
        info!(
            quoted = %self.config.maker.quoted_instrument,
            reference = %self.config.maker.reference_instrument,
            "Entering main event loop"
        );

        let stats_every = self.config.replay.stats_interval_secs;
        let period = Duration::from_secs(stats_every.max(1));
        let mut stats_interval = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(envelope) => self.process(&envelope),
                        None => {
                            info!("Event stream ended");
                            break;
                        }
                    }
                }

                _ = stats_interval.tick(), if stats_every > 0 => {
                    self.engine.stats().log_summary(self.config.maker.price_unit);
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(handled = self.handled, failed = self.failed, "Shutting down");
        let unit = self.config.maker.price_unit;
        self.engine.stats().log_summary(unit);
        Ok(self.engine.stats().summary(unit))
    }

    pub fn engine(&self) -> &MarketMaker<G> {
        &self.engine
    }

    pub fn handled(&self) -> u64 {
        self.handled
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReplayConfig;
    use rtg_core::{BookLevel, InboundEvent, Instrument, MarketSnapshot};
    use rtg_mm::RecordingGateway;

    fn config() -> AppConfig {
        AppConfig {
            replay: ReplayConfig {
                stats_interval_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn future(ts_ms: u64, sequence: u64) -> EventEnvelope {
        EventEnvelope {
            ts_ms,
            event: InboundEvent::Snapshot(MarketSnapshot::new(
                Instrument::Future,
                sequence,
                vec![BookLevel::new(10_050, 5)],
                vec![BookLevel::new(9_950, 5)],
            )),
        }
    }

    #[test]
    fn test_process_counts_failures_but_not_duplicates() {
        let mut app = Application::new(config(), RecordingGateway::new()).unwrap();
        app.process(&future(0, 1));
        app.process(&future(1, 1));
        app.process(&EventEnvelope {
            ts_ms: 2,
            event: InboundEvent::HedgeFill {
                order_id: rtg_core::OrderId(99),
                price: rtg_core::Price(9_900),
                volume: rtg_core::Volume(1),
            },
        });

        assert_eq!(app.handled(), 3);
        assert_eq!(app.failed(), 1);
        assert_eq!(app.engine().gateway().submits().len(), 2);
    }

    #[test]
    fn test_run_drains_channel() {
        let app = Application::new(config(), RecordingGateway::new()).unwrap();
        let (tx, rx) = mpsc::channel(8);
        for seq in 1..=3 {
            tx.try_send(future(seq * 10, seq)).unwrap();
        }
        drop(tx);

        let summary = tokio_test::block_on(app.run(rx)).unwrap();
        assert_eq!(summary.snapshots, 3);
        assert_eq!(summary.quotes_submitted, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = config();
        config.maker.lot_size = 0;
        assert!(matches!(
            Application::new(config, RecordingGateway::new()),
            Err(crate::error::AppError::Config(_))
        ));
    }
}
