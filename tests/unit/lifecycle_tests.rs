//! End-to-end order lifecycle scenarios driven through the command layer.

use chronobook::prelude::*;
use chrono::{DateTime, TimeZone, Utc};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn place(id: &str, price: i64, side: Side, size: i64, t: DateTime<Utc>) -> BookCommand {
    BookCommand::Place {
        order: Order {
            id: OrderId::new(id),
            price,
            side,
        },
        size,
        time: t,
    }
}

fn mutate(id: &str, mutations: Vec<OrderMutation>) -> BookCommand {
    BookCommand::Mutate {
        id: OrderId::new(id),
        mutations,
    }
}

fn maker_match(size: i64, trade_id: i64, t: DateTime<Utc>) -> OrderMutation {
    OrderMutation::Match {
        trade_id,
        size,
        was_maker: true,
        maker_id: None,
        time: t,
    }
}

#[test]
fn order_lifecycle_from_placement_to_overfill() {
    let book = OrderBook::new("BTC-USD");
    let id = OrderId::new("A");

    place("A", 100, Side::Buy, 10, ts(0)).apply(&book).unwrap();
    let version = book.get(&id).unwrap();
    assert_eq!((version.state, version.size), (OrderState::Pending, 10));

    mutate(
        "A",
        vec![OrderMutation::State {
            state: OrderState::Open,
            time: ts(1),
        }],
    )
    .apply(&book)
    .unwrap();
    let version = book.get(&id).unwrap();
    assert_eq!((version.state, version.size), (OrderState::Open, 10));

    mutate("A", vec![maker_match(4, 1, ts(2))])
        .apply(&book)
        .unwrap();
    let version = book.get(&id).unwrap();
    assert_eq!((version.state, version.size), (OrderState::Open, 6));

    mutate("A", vec![maker_match(6, 2, ts(3))])
        .apply(&book)
        .unwrap();
    let version = book.get(&id).unwrap();
    assert_eq!((version.state, version.size), (OrderState::Filled, 0));

    // A match against the filled order is absorbed without effect.
    mutate("A", vec![maker_match(1, 3, ts(4))])
        .apply(&book)
        .unwrap();
    let version = book.get(&id).unwrap();
    assert_eq!((version.state, version.size), (OrderState::Filled, 0));
}

#[test]
fn out_of_order_sizes_resolve_by_event_time() {
    let book = OrderBook::new("BTC-USD");
    place("B", 100, Side::Buy, 10, ts(0)).apply(&book).unwrap();

    mutate(
        "B",
        vec![
            OrderMutation::Size {
                new_size: 20,
                time: ts(1),
            },
            OrderMutation::Size {
                new_size: 15,
                time: ts(0),
            },
        ],
    )
    .apply(&book)
    .unwrap();

    assert_eq!(book.get(&OrderId::new("B")).unwrap().size, 20);
}

#[test]
fn historical_versions_are_reachable_at_any_time() {
    let book = OrderBook::new("BTC-USD");
    let id = OrderId::new("C");
    place("C", 100, Side::Buy, 10, ts(0)).apply(&book).unwrap();
    mutate(
        "C",
        vec![OrderMutation::Size {
            new_size: 9,
            time: ts(1),
        }],
    )
    .apply(&book)
    .unwrap();
    mutate(
        "C",
        vec![OrderMutation::Size {
            new_size: 5,
            time: ts(2),
        }],
    )
    .apply(&book)
    .unwrap();

    assert_eq!(book.version_at(&id, ts(0)).unwrap().size, 10);
    assert_eq!(book.version_at(&id, ts(1)).unwrap().size, 9);
    assert_eq!(book.version_at(&id, ts(2)).unwrap().size, 5);
    assert_eq!(book.version_at(&id, ts(-1)).unwrap().size, 10);
}

#[test]
fn price_levels_and_vacuum() {
    let book = OrderBook::new("BTC-USD");
    for (id, price) in [("one", 100), ("two", 100), ("three", 100), ("four", 200)] {
        place(id, price, Side::Buy, 10, ts(0)).apply(&book).unwrap();
    }

    assert_eq!(book.price_level(100, None).len(), 3);
    assert_eq!(book.price_level(200, None).len(), 1);
    assert!(book.price_level(10_000_000, None).is_empty());

    mutate(
        "one",
        vec![OrderMutation::State {
            state: OrderState::Void,
            time: ts(1),
        }],
    )
    .apply(&book)
    .unwrap();
    book.vacuum();

    assert!(book.get(&OrderId::new("one")).is_err());
    assert_eq!(book.price_level(100, None).len(), 2);
}

#[test]
fn top_of_book_tracks_open_transitions() {
    let book = OrderBook::new("BTC-USD");
    place("bid", 100, Side::Buy, 10, ts(0)).apply(&book).unwrap();
    place("ask", 110, Side::Sell, 10, ts(0)).apply(&book).unwrap();

    let top = book.top_of_book(ts(0));
    assert_eq!((top.bid, top.ask, top.mid, top.spread), (-1, -1, -1, 0));

    for id in ["bid", "ask"] {
        mutate(
            id,
            vec![OrderMutation::State {
                state: OrderState::Open,
                time: ts(1),
            }],
        )
        .apply(&book)
        .unwrap();
    }

    let top = book.top_of_book(ts(1));
    assert_eq!((top.bid, top.ask, top.mid, top.spread), (100, 110, 105, 10));
}

#[test]
fn match_fans_out_to_both_counterparties() {
    let book = OrderBook::new("BTC-USD");
    place("taker", 100, Side::Buy, 10, ts(0)).apply(&book).unwrap();
    place("maker", 100, Side::Sell, 10, ts(0)).apply(&book).unwrap();
    for id in ["taker", "maker"] {
        mutate(
            id,
            vec![OrderMutation::State {
                state: OrderState::Open,
                time: ts(1),
            }],
        )
        .apply(&book)
        .unwrap();
    }

    CommandBatch {
        sequence: 9,
        commands: vec![
            mutate(
                "taker",
                vec![OrderMutation::Match {
                    trade_id: 77,
                    size: 4,
                    was_maker: false,
                    maker_id: Some(OrderId::new("maker")),
                    time: ts(2),
                }],
            ),
            mutate("maker", vec![maker_match(4, 77, ts(2))]),
        ],
    }
    .apply(&book)
    .unwrap();

    let taker = book.get(&OrderId::new("taker")).unwrap();
    assert_eq!(taker.size, 6);
    assert_eq!(taker.makers, vec![OrderId::new("maker")]);

    let maker = book.get(&OrderId::new("maker")).unwrap();
    assert_eq!(maker.size, 6);
    assert!(maker.makers.is_empty());

    assert_eq!(book.last_sequence(), Some(9));
}

#[test]
fn snapshot_seed_then_realtime_mutations() {
    // Seed the book from a REST snapshot, then fold in a realtime fill for
    // one of the seeded orders. The synthesized placement time sorts before
    // the realtime event, so replay applies them in the right order.
    let book = OrderBook::new("BTC-USD");
    let received_at = ts(100);

    let seed = decode_snapshot(
        br#"{
            "sequence": 3,
            "bids": [[ "1.00", "0.50", "aaaa" ]],
            "asks": [[ "1.10", "0.50", "bbbb" ]]
        }"#,
        received_at,
    )
    .unwrap();
    seed.apply(&book).unwrap();
    assert_eq!(book.last_sequence(), Some(3));

    for id in ["aaaa", "bbbb"] {
        mutate(
            id,
            vec![OrderMutation::State {
                state: OrderState::Open,
                time: ts(101),
            }],
        )
        .apply(&book)
        .unwrap();
    }

    let trade = decode_event(
        br#"{
            "type": "match",
            "trade_id": 1,
            "sequence": 4,
            "maker_order_id": "aaaa",
            "taker_order_id": "bbbb",
            "time": "1970-01-01T00:01:42Z",
            "size": "0.25",
            "price": "1.00",
            "side": "buy"
        }"#,
    )
    .unwrap();
    trade.apply(&book).unwrap();

    assert_eq!(book.get(&OrderId::new("aaaa")).unwrap().size, 25_000_000);
    assert_eq!(book.get(&OrderId::new("bbbb")).unwrap().size, 25_000_000);
    assert_eq!(book.last_sequence(), Some(4));
}
