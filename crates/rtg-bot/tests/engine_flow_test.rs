//! End-to-end engine flows through the application layer.

mod integration;
use integration::common::*;

use rtg_bot::AppConfig;
use rtg_core::{Instrument, Lifespan, OrderId, OrderSide, Price, Volume};
use rtg_mm::{GatewayCall, MakerConfig};

fn config_with(maker: MakerConfig) -> AppConfig {
    AppConfig {
        maker,
        ..Default::default()
    }
}

/// mid 10000, σ 0.002, γ 0.01, κ 0.2, τ 1, tick 100 → 9500 / 10500.
#[test]
fn test_first_reference_snapshot_quotes_both_sides() {
    let (mut app, gw) = default_app();
    app.process(&future(0, 1, 9_950, 10_050));

    assert_eq!(
        gw.calls(),
        vec![
            GatewayCall::Submit {
                id: OrderId(1),
                side: OrderSide::Buy,
                price: Price(9_500),
                volume: Volume(10),
                lifespan: Lifespan::GoodForDay,
            },
            GatewayCall::Submit {
                id: OrderId(2),
                side: OrderSide::Sell,
                price: Price(10_500),
                volume: Volume(10),
                lifespan: Lifespan::GoodForDay,
            },
        ]
    );
    let target = app.engine().last_target().unwrap();
    assert_eq!(target.reservation_price, 10_000.0);
    assert!((target.spread - 975.8033).abs() < 1e-3);
    assert_inventory_consistent(app.engine());
}

#[test]
fn test_quoted_instrument_snapshots_never_quote() {
    let (mut app, gw) = default_app();
    for seq in 1..=5 {
        app.process(&snapshot(0, Instrument::Etf, seq, 9_950, 10_050));
    }
    assert!(gw.calls().is_empty());
    assert_eq!(app.engine().last_quoted_mid(), Some(10_000.0));
    assert_eq!(app.engine().stats().snapshots, 5);
}

#[test]
fn test_bid_fill_hedges_and_requotes() {
    let (mut app, gw) = default_app();
    app.process(&future(0, 1, 9_950, 10_050));
    app.process(&ack(10, 1, 0, 10));
    app.process(&fill(20, 1, 9_500, 10));

    let calls = gw.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(
        calls[2],
        GatewayCall::Hedge {
            id: OrderId(3),
            side: OrderSide::Sell,
            price: Price(100),
            volume: Volume(10),
        }
    );
    assert_eq!(
        calls[3],
        GatewayCall::Submit {
            id: OrderId(4),
            side: OrderSide::Buy,
            price: Price(9_500),
            volume: Volume(10),
            lifespan: Lifespan::GoodForDay,
        }
    );

    let inv = app.engine().tracker().inventory();
    assert_eq!(inv.confirmed, 10);
    assert_inventory_consistent(app.engine());

    // Late non-terminal ack for the retired order is harmless.
    app.process(&ack(30, 1, 10, 0));
    assert_eq!(app.failed(), 0);

    app.process(&hedge_fill(40, 3, 9_900, 10));
    assert_eq!(app.engine().hedger().position(), -10);
}

#[test]
fn test_ask_fill_hedges_with_buy_at_cap() {
    let (mut app, gw) = default_app();
    app.process(&future(0, 1, 9_950, 10_050));
    app.process(&fill(5, 2, 10_500, 4));

    assert_eq!(
        gw.hedges(),
        vec![GatewayCall::Hedge {
            id: OrderId(3),
            side: OrderSide::Buy,
            price: Price(2_147_483_600),
            volume: Volume(4),
        }]
    );
    assert_eq!(app.engine().tracker().inventory().confirmed, -4);
    assert_inventory_consistent(app.engine());
}

#[test]
fn test_replayed_snapshots_do_not_duplicate_orders() {
    let (mut app, gw) = default_app();
    let snap = future(0, 7, 9_950, 10_050);
    app.process(&snap);
    app.process(&snap);
    app.process(&snap);
    app.process(&future(5, 6, 9_950, 10_050));

    assert_eq!(gw.submits().len(), 2);
    assert_eq!(app.engine().tracker().active_count(), 2);
    assert_eq!(app.engine().stats().skipped_events, 3);
    assert_eq!(app.handled(), 4);
    assert_eq!(app.failed(), 0);
}

#[test]
fn test_position_limit_blocks_bid_and_sizes_unwind() {
    let maker = MakerConfig {
        position_limit: 10,
        ..Default::default()
    };
    let (mut app, gw) = app_with(config_with(maker));
    app.process(&future(0, 1, 9_950, 10_050));
    app.process(&fill(10, 1, 9_500, 10));

    // Long at the limit: no new bid.
    assert!(app.engine().quote_state(OrderSide::Buy).is_idle());
    assert_eq!(gw.submits().len(), 2);

    // Ask rejected → replaced with an unwind order capped by capacity.
    app.process(&ack(20, 2, 0, 0));
    let submits = gw.submits();
    assert_eq!(submits.len(), 3);
    assert_eq!(
        submits[2],
        GatewayCall::Submit {
            id: OrderId(4),
            side: OrderSide::Sell,
            price: Price(10_500),
            volume: Volume(20),
            lifespan: Lifespan::GoodForDay,
        }
    );

    let inv = app.engine().tracker().inventory();
    assert_eq!(inv.confirmed, 10);
    assert_eq!(inv.theoretical, -10);
    assert!(inv.theoretical.abs() <= 10);
    assert_inventory_consistent(app.engine());
}

#[test]
fn test_reject_rolls_back_without_retry() {
    let maker = MakerConfig {
        requote_on_terminal: false,
        ..Default::default()
    };
    let (mut app, gw) = app_with(config_with(maker));
    app.process(&future(0, 1, 9_950, 10_050));
    app.process(&venue_error(5, 1, "price out of range"));

    let engine = app.engine();
    assert!(!engine.tracker().contains(OrderId(1)));
    assert_eq!(engine.tracker().inventory().theoretical, -10);
    assert_eq!(engine.tracker().inventory().confirmed, 0);
    assert_eq!(engine.stats().rejects, 1);
    assert_eq!(gw.submits().len(), 2);
    assert_inventory_consistent(engine);
}

#[test]
fn test_stale_quotes_cancelled_then_replaced() {
    let (mut app, gw) = default_app();
    app.process(&future(0, 1, 9_950, 10_050));
    app.process(&ack(10, 1, 0, 10));
    app.process(&ack(10, 2, 0, 10));

    app.process(&future(4_000, 2, 9_950, 10_050));
    assert_eq!(
        gw.cancels(),
        vec![
            GatewayCall::Cancel { id: OrderId(1) },
            GatewayCall::Cancel { id: OrderId(2) },
        ]
    );
    assert!(gw.submits().len() == 2);

    // Cancel confirmed → side idle → fresh bid at the last target.
    app.process(&ack(4_010, 1, 0, 0));
    let submits = gw.submits();
    assert_eq!(submits.len(), 3);
    assert!(matches!(
        submits[2],
        GatewayCall::Submit {
            id: OrderId(3),
            side: OrderSide::Buy,
            price: Price(9_500),
            ..
        }
    ));
    assert_eq!(app.engine().stats().rejects, 0);
    assert_inventory_consistent(app.engine());
}

#[test]
fn test_partial_fill_then_cancel() {
    let (mut app, gw) = default_app();
    app.process(&future(0, 1, 9_950, 10_050));
    app.process(&ack(10, 1, 0, 10));
    app.process(&fill(20, 1, 9_500, 4));
    assert_inventory_consistent(app.engine());

    // Reference moves up 1000: resting bid is repriced.
    app.process(&future(30, 2, 10_950, 11_050));
    assert!(gw.cancels().contains(&GatewayCall::Cancel { id: OrderId(1) }));

    app.process(&ack(40, 1, 4, 0));
    let inv = app.engine().tracker().inventory();
    assert_eq!(inv.confirmed, 4);
    assert!(!app.engine().tracker().contains(OrderId(1)));
    assert_inventory_consistent(app.engine());

    // Replacement bid at the new target, sized by the full lot.
    let last = gw.submits().pop().unwrap();
    assert!(matches!(
        last,
        GatewayCall::Submit {
            side: OrderSide::Buy,
            price: Price(10_500),
            volume: Volume(10),
            ..
        }
    ));
}

#[test]
fn test_malformed_reference_snapshot_skipped() {
    let (mut app, gw) = default_app();
    app.process(&future(0, 1, 10_100, 10_000));
    assert!(gw.calls().is_empty());
    assert_eq!(app.failed(), 1);

    app.process(&future(1, 2, 9_950, 10_050));
    assert_eq!(gw.submits().len(), 2);
}

#[test]
fn test_unknown_fill_is_reported_without_hedge() {
    let (mut app, gw) = default_app();
    app.process(&fill(0, 42, 10_000, 10));
    assert!(gw.hedges().is_empty());
    assert_eq!(app.failed(), 1);
}
