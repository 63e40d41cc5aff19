//! Outbound order-entry seam.
//!
//! The engine decides; an `OrderGateway` carries decisions to the venue.
//! Keeping the venue behind a trait lets tests drive the whole engine with
//! `RecordingGateway` and inspect exactly what would have been sent.

use parking_lot::Mutex;
use rtg_core::{Lifespan, OrderId, OrderSide, Price, Volume};

/// Order-entry calls the engine makes.
pub trait OrderGateway: Send + Sync {
    /// Insert a quote on the quoted instrument.
    fn submit_order(
        &self,
        id: OrderId,
        side: OrderSide,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    );

    /// Cancel a live quote.
    fn cancel_order(&self, id: OrderId);

    /// Insert a hedge on the reference instrument.
    fn submit_hedge(&self, id: OrderId, side: OrderSide, price: Price, volume: Volume);
}

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Submit {
        id: OrderId,
        side: OrderSide,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    },
    Cancel {
        id: OrderId,
    },
    Hedge {
        id: OrderId,
        side: OrderSide,
        price: Price,
        volume: Volume,
    },
}

/// Gateway that records every call for verification.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    /// Drain the recorded calls.
    pub fn take(&self) -> Vec<GatewayCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn submits(&self) -> Vec<GatewayCall> {
        self.filtered(|c| matches!(c, GatewayCall::Submit { .. }))
    }

    pub fn cancels(&self) -> Vec<GatewayCall> {
        self.filtered(|c| matches!(c, GatewayCall::Cancel { .. }))
    }

    pub fn hedges(&self) -> Vec<GatewayCall> {
        self.filtered(|c| matches!(c, GatewayCall::Hedge { .. }))
    }

    fn filtered(&self, keep: impl Fn(&GatewayCall) -> bool) -> Vec<GatewayCall> {
        self.calls.lock().iter().filter(|c| keep(c)).cloned().collect()
    }
}

impl OrderGateway for RecordingGateway {
    fn submit_order(
        &self,
        id: OrderId,
        side: OrderSide,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    ) {
        self.calls.lock().push(GatewayCall::Submit {
            id,
            side,
            price,
            volume,
            lifespan,
        });
    }

    fn cancel_order(&self, id: OrderId) {
        self.calls.lock().push(GatewayCall::Cancel { id });
    }

    fn submit_hedge(&self, id: OrderId, side: OrderSide, price: Price, volume: Volume) {
        self.calls.lock().push(GatewayCall::Hedge {
            id,
            side,
            price,
            volume,
        });
    }
}

impl<G: OrderGateway + ?Sized> OrderGateway for std::sync::Arc<G> {
    fn submit_order(
        &self,
        id: OrderId,
        side: OrderSide,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    ) {
        (**self).submit_order(id, side, price, volume, lifespan)
    }

    fn cancel_order(&self, id: OrderId) {
        (**self).cancel_order(id)
    }

    fn submit_hedge(&self, id: OrderId, side: OrderSide, price: Price, volume: Volume) {
        (**self).submit_hedge(id, side, price, volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_recording_gateway_keeps_order() {
        let gw = RecordingGateway::new();
        gw.submit_order(
            OrderId(1),
            OrderSide::Buy,
            Price(9_900),
            Volume(10),
            Lifespan::GoodForDay,
        );
        gw.cancel_order(OrderId(1));
        gw.submit_hedge(OrderId(2), OrderSide::Sell, Price(100), Volume(10));

        let calls = gw.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], GatewayCall::Cancel { id: OrderId(1) });
        assert_eq!(gw.submits().len(), 1);
        assert_eq!(gw.hedges().len(), 1);

        assert_eq!(gw.take().len(), 3);
        assert!(gw.calls().is_empty());
    }

    #[test]
    fn test_shared_gateway_through_arc() {
        let gw = Arc::new(RecordingGateway::new());
        let shared: Arc<RecordingGateway> = gw.clone();
        shared.cancel_order(OrderId(5));
        assert_eq!(gw.cancels(), vec![GatewayCall::Cancel { id: OrderId(5) }]);
    }
}
