//! Gateway used by the replay binary.
//!
//! There is no venue connection during replay; outbound orders are logged
//! and counted so a session can be inspected after the fact.

use std::sync::atomic::{AtomicU64, Ordering};

use rtg_core::{Lifespan, OrderId, OrderSide, Price, Volume};
use rtg_mm::OrderGateway;
use tracing::info;

/// Logs every outbound order.
#[derive(Debug, Default)]
pub struct LoggingGateway {
    submitted: AtomicU64,
    cancelled: AtomicU64,
    hedged: AtomicU64,
}

/// Outbound call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatewayCounts {
    pub submitted: u64,
    pub cancelled: u64,
    pub hedged: u64,
}

impl LoggingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> GatewayCounts {
        GatewayCounts {
            submitted: self.submitted.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            hedged: self.hedged.load(Ordering::Relaxed),
        }
    }
}

impl OrderGateway for LoggingGateway {
    fn submit_order(
        &self,
        id: OrderId,
        side: OrderSide,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    ) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        info!(
            order_id = %id,
            side = %side,
            price = %price,
            volume = %volume,
            lifespan = %lifespan,
            "OUT insert_order"
        );
    }

    fn cancel_order(&self, id: OrderId) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
        info!(order_id = %id, "OUT cancel_order");
    }

    fn submit_hedge(&self, id: OrderId, side: OrderSide, price: Price, volume: Volume) {
        self.hedged.fetch_add(1, Ordering::Relaxed);
        info!(
            order_id = %id,
            side = %side,
            price = %price,
            volume = %volume,
            "OUT hedge_order"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_each_call_kind() {
        let gw = LoggingGateway::new();
        gw.submit_order(
            OrderId(1),
            OrderSide::Buy,
            Price(9_500),
            Volume(10),
            Lifespan::GoodForDay,
        );
        gw.submit_order(
            OrderId(2),
            OrderSide::Sell,
            Price(10_500),
            Volume(10),
            Lifespan::GoodForDay,
        );
        gw.cancel_order(OrderId(1));
        gw.submit_hedge(OrderId(3), OrderSide::Sell, Price(100), Volume(10));

        assert_eq!(
            gw.counts(),
            GatewayCounts {
                submitted: 2,
                cancelled: 1,
                hedged: 1,
            }
        );
    }
}
