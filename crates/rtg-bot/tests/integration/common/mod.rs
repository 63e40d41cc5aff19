//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use rtg_bot::{AppConfig, Application};
use rtg_core::{
    BookLevel, EventEnvelope, InboundEvent, Instrument, MarketSnapshot, OrderId, Price, Volume,
};
use rtg_mm::{MarketMaker, OrderGateway, RecordingGateway};

pub type TestApp = Application<Arc<RecordingGateway>>;

/// Application wired to a recording gateway the test keeps a handle to.
pub fn app_with(config: AppConfig) -> (TestApp, Arc<RecordingGateway>) {
    let gateway = Arc::new(RecordingGateway::new());
    let app = Application::new(config, gateway.clone()).unwrap();
    (app, gateway)
}

pub fn default_app() -> (TestApp, Arc<RecordingGateway>) {
    app_with(AppConfig::default())
}

pub fn snapshot(ts_ms: u64, instrument: Instrument, sequence: u64, bid: i64, ask: i64) -> EventEnvelope {
    EventEnvelope {
        ts_ms,
        event: InboundEvent::Snapshot(MarketSnapshot::new(
            instrument,
            sequence,
            vec![BookLevel::new(ask, 100)],
            vec![BookLevel::new(bid, 100)],
        )),
    }
}

pub fn future(ts_ms: u64, sequence: u64, bid: i64, ask: i64) -> EventEnvelope {
    snapshot(ts_ms, Instrument::Future, sequence, bid, ask)
}

pub fn ack(ts_ms: u64, id: u64, filled: u32, remaining: u32) -> EventEnvelope {
    EventEnvelope {
        ts_ms,
        event: InboundEvent::OrderAck {
            order_id: OrderId(id),
            filled_volume: Volume(filled),
            remaining_volume: Volume(remaining),
            fees: 0,
        },
    }
}

pub fn fill(ts_ms: u64, id: u64, price: i64, volume: u32) -> EventEnvelope {
    EventEnvelope {
        ts_ms,
        event: InboundEvent::Fill {
            order_id: OrderId(id),
            price: Price(price),
            volume: Volume(volume),
        },
    }
}

pub fn hedge_fill(ts_ms: u64, id: u64, price: i64, volume: u32) -> EventEnvelope {
    EventEnvelope {
        ts_ms,
        event: InboundEvent::HedgeFill {
            order_id: OrderId(id),
            price: Price(price),
            volume: Volume(volume),
        },
    }
}

pub fn venue_error(ts_ms: u64, id: u64, message: &str) -> EventEnvelope {
    EventEnvelope {
        ts_ms,
        event: InboundEvent::Error {
            order_id: OrderId(id),
            message: message.to_string(),
        },
    }
}

/// Theoretical inventory equals confirmed plus every live order's signed
/// remaining volume.
pub fn assert_inventory_consistent<G: OrderGateway>(engine: &MarketMaker<G>) {
    let tracker = engine.tracker();
    let in_flight: i64 = tracker
        .orders()
        .map(|r| r.side.signed(r.remaining.lots()))
        .sum();
    let inv = tracker.inventory();
    assert_eq!(inv.theoretical, inv.confirmed + in_flight, "{inv:?}");
}

/// Write events as JSON lines to a fresh temp file.
pub fn write_events(name: &str, events: &[EventEnvelope]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rtg-it-{}-{name}", std::process::id()));
    let body: String = events
        .iter()
        .map(|e| serde_json::to_string(e).unwrap() + "\n")
        .collect();
    std::fs::write(&path, body).unwrap();
    path
}
