//! Property-based invariants for replay, the global clock, and vacuum.

use chronobook::prelude::*;
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn birth(id: &str) -> Order {
    Order {
        id: OrderId::new(id),
        price: 100,
        side: Side::Buy,
    }
}

fn arb_state() -> impl Strategy<Value = OrderState> {
    prop_oneof![
        Just(OrderState::Pending),
        Just(OrderState::Open),
        Just(OrderState::Filled),
        Just(OrderState::Void),
    ]
}

/// A mutation log with strictly increasing, distinct event times, so every
/// permutation has a single canonical sort order.
fn arb_log() -> impl Strategy<Value = Vec<OrderMutation>> {
    prop::collection::vec((0u8..3, 0i64..100, any::<bool>()), 1..16).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (kind, value, was_maker))| {
                let time = ts(i as i64 + 1);
                match kind {
                    0 => OrderMutation::State {
                        state: match value % 4 {
                            0 => OrderState::Pending,
                            1 => OrderState::Open,
                            2 => OrderState::Filled,
                            _ => OrderState::Void,
                        },
                        time,
                    },
                    1 => OrderMutation::Size {
                        new_size: value,
                        time,
                    },
                    _ => OrderMutation::Match {
                        trade_id: i as i64,
                        size: value % 40 + 1,
                        was_maker,
                        maker_id: (!was_maker).then(|| OrderId::new("m")),
                        time,
                    },
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn arrival_order_never_changes_the_outcome(shuffled in arb_log().prop_shuffle()) {
        let mut sorted = shuffled.clone();
        sorted.sort_by_key(OrderMutation::time);

        let mut as_one_batch = OrderHistory::new(birth("x"), 50, ts(0));
        as_one_batch.append(shuffled.clone());

        let mut presorted = OrderHistory::new(birth("x"), 50, ts(0));
        presorted.append(sorted);

        let mut one_at_a_time = OrderHistory::new(birth("x"), 50, ts(0));
        for mutation in shuffled {
            one_at_a_time.append(vec![mutation]);
        }

        prop_assert_eq!(as_one_batch.latest(), presorted.latest());
        prop_assert_eq!(as_one_batch.latest(), one_at_a_time.latest());
    }

    #[test]
    fn derived_clock_never_exceeds_the_probe(log in arb_log(), probe in -2i64..20) {
        let mut history = OrderHistory::new(birth("x"), 50, ts(0));
        history.append(log);

        let version = history.version_at(ts(probe));
        if let Some(seen) = version.last_mutation {
            prop_assert!(seen <= ts(probe));
        }
    }

    #[test]
    fn terminal_orders_absorb_later_matches(
        fills in prop::collection::vec((1i64..50, any::<bool>()), 1..8)
    ) {
        let mut history = OrderHistory::new(birth("x"), 10, ts(0));
        history.append(vec![
            OrderMutation::State { state: OrderState::Open, time: ts(1) },
            OrderMutation::Match {
                trade_id: 0,
                size: 10,
                was_maker: true,
                maker_id: None,
                time: ts(2),
            },
        ]);
        prop_assert_eq!(history.latest().state, OrderState::Filled);
        let makers_before = history.latest().makers.clone();

        for (i, (size, was_maker)) in fills.into_iter().enumerate() {
            history.append(vec![OrderMutation::Match {
                trade_id: i as i64 + 1,
                size,
                was_maker,
                maker_id: (!was_maker).then(|| OrderId::new("m")),
                time: ts(3 + i as i64),
            }]);
        }

        prop_assert_eq!(history.latest().size, 0);
        prop_assert_eq!(history.latest().state, OrderState::Filled);
        prop_assert_eq!(&history.latest().makers, &makers_before);
    }

    #[test]
    fn global_clock_is_monotonic(times in prop::collection::vec(0i64..100, 1..20)) {
        let book = OrderBook::new("BTC-USD");
        let mut watermark = None;

        for (i, t) in times.iter().enumerate() {
            if i % 3 == 0 {
                book.place(
                    Order {
                        id: OrderId::new(format!("o{i}")),
                        price: 100,
                        side: Side::Buy,
                    },
                    10,
                    ts(*t),
                )
                .unwrap();
            } else {
                let target = OrderId::new(format!("o{}", i - (i % 3)));
                book.mutate(
                    &target,
                    vec![OrderMutation::Size { new_size: 5, time: ts(*t) }],
                )
                .unwrap();
            }

            let now = book.last_mutation_time();
            prop_assert!(now >= watermark);
            watermark = now;
        }
    }

    #[test]
    fn vacuum_leaves_no_terminal_histories(
        states in prop::collection::vec(arb_state(), 1..20)
    ) {
        let book = OrderBook::new("BTC-USD");
        let mut ids = Vec::new();

        for (i, state) in states.iter().enumerate() {
            let id = OrderId::new(format!("o{i}"));
            book.place(
                Order { id: id.clone(), price: 100, side: Side::Buy },
                10,
                ts(0),
            )
            .unwrap();
            book.mutate(
                &id,
                vec![OrderMutation::State { state: *state, time: ts(1) }],
            )
            .unwrap();
            ids.push(id);
        }

        book.vacuum();

        for id in &ids {
            if let Ok(version) = book.get(id) {
                prop_assert!(!version.state.is_terminal());
            }
        }
    }
}
