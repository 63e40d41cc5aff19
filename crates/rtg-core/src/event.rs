//! Inbound events delivered by the venue connection.
//!
//! The engine consumes these one at a time. The JSON form is what the
//! replay binary reads, one envelope per line.

use serde::{Deserialize, Serialize};

use crate::book::{MarketSnapshot, TradePrint};
use crate::error::CoreError;
use crate::order::OrderId;
use crate::price::{Price, Volume};

/// Everything the venue can tell the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Snapshot(MarketSnapshot),
    TradePrint(TradePrint),
    /// Order status update. `filled_volume` is cumulative; a zero
    /// `remaining_volume` means the order is gone from the book.
    OrderAck {
        order_id: OrderId,
        filled_volume: Volume,
        remaining_volume: Volume,
        #[serde(default)]
        fees: i64,
    },
    Fill {
        order_id: OrderId,
        price: Price,
        volume: Volume,
    },
    HedgeFill {
        order_id: OrderId,
        price: Price,
        volume: Volume,
    },
    Error {
        #[serde(default)]
        order_id: OrderId,
        message: String,
    },
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::TradePrint(_) => "trade_print",
            Self::OrderAck { .. } => "order_ack",
            Self::Fill { .. } => "fill",
            Self::HedgeFill { .. } => "hedge_fill",
            Self::Error { .. } => "error",
        }
    }
}

/// Event stamped with its receive time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub ts_ms: u64,
    pub event: InboundEvent,
}

impl EventEnvelope {
    /// Decode one JSON line.
    pub fn from_json_line(line: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Instrument;

    #[test]
    fn test_decode_order_ack_line() {
        let line = r#"{"ts_ms":1500,"event":{"type":"order_ack","order_id":4,"filled_volume":0,"remaining_volume":10}}"#;
        let env = EventEnvelope::from_json_line(line).unwrap();
        assert_eq!(env.ts_ms, 1500);
        assert_eq!(
            env.event,
            InboundEvent::OrderAck {
                order_id: OrderId(4),
                filled_volume: Volume(0),
                remaining_volume: Volume(10),
                fees: 0,
            }
        );
        assert_eq!(env.event.kind(), "order_ack");
    }

    #[test]
    fn test_decode_snapshot_line() {
        let line = r#"{"ts_ms":1,"event":{"type":"snapshot","instrument":"etf","sequence":2,"asks":[],"bids":[]}}"#;
        let env = EventEnvelope::from_json_line(line).unwrap();
        match env.event {
            InboundEvent::Snapshot(snap) => {
                assert_eq!(snap.instrument, Instrument::Etf);
                assert_eq!(snap.sequence, 2);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_error_without_order_id() {
        let line = r#"{"ts_ms":9,"event":{"type":"error","message":"rate limit"}}"#;
        let env = EventEnvelope::from_json_line(line).unwrap();
        assert!(matches!(env.event, InboundEvent::Error { order_id, .. } if order_id.is_none()));
    }

    #[test]
    fn test_garbage_line_is_decode_error() {
        assert!(matches!(
            EventEnvelope::from_json_line("{not json"),
            Err(CoreError::EventDecode(_))
        ));
    }
}
