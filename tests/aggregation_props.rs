// Property-based tests for aggregation, collapse toggling and running balances.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashMap;

use cashflow_dashboard::{
    CollapseState, LedgerEntry, Money, NodeKey, SalesOrder, aggregate_by_day,
    aggregate_by_day_and_group, flatten, running_balances,
};
use chrono::NaiveDate;
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Копейки от 0 до 1 000 000,00; иногда поле пустое.
fn arb_amount() -> impl Strategy<Value = Option<Money>> {
    prop_oneof![
        3 => (0i64..100_000_000i64).prop_map(|cents| Some(Money::new(cents, 2))),
        1 => Just(None),
    ]
}

/// Заказ за один из первых десяти дней июня в одной из трёх групп.
/// Номер заказа заполняется позже порядковым индексом.
fn arb_order() -> impl Strategy<Value = SalesOrder> {
    (1u32..=10, 0usize..3, arb_amount(), arb_amount()).prop_map(|(day, group, debit, credit)| {
        let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        SalesOrder {
            date,
            date_label: date.to_string(),
            group_name: ["Плитка", "Сантехника", "Обои"][group].to_string(),
            order_id: String::new(),
            debit,
            credit,
            counterparty: String::new(),
            manager: String::new(),
            product: String::new(),
            cost: Money::ZERO,
            gross_profit: Money::ZERO,
            payment_method: None,
        }
    })
}

fn arb_orders() -> impl Strategy<Value = Vec<SalesOrder>> {
    prop::collection::vec(arb_order(), 0..60).prop_map(|mut orders| {
        for (index, order) in orders.iter_mut().enumerate() {
            order.order_id = index.to_string();
        }
        orders
    })
}

fn multiset(orders: &[SalesOrder]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for order in orders {
        *counts.entry(order.order_id.clone()).or_insert(0) += 1;
    }
    counts
}

fn index_of(order: &SalesOrder) -> usize {
    order.order_id.parse().unwrap()
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn days_strictly_ascending(orders in arb_orders()) {
        for days in [aggregate_by_day(&orders), aggregate_by_day_and_group(&orders)] {
            prop_assert!(days.windows(2).all(|w| w[0].date < w[1].date));
        }
    }

    #[test]
    fn same_day_order_is_stable(orders in arb_orders()) {
        let flat = flatten(&aggregate_by_day(&orders));
        for pair in flat.windows(2) {
            if pair[0].date == pair[1].date {
                prop_assert!(index_of(&pair[0]) < index_of(&pair[1]));
            }
        }
    }

    #[test]
    fn group_contents_keep_input_order(orders in arb_orders()) {
        for day in aggregate_by_day_and_group(&orders) {
            for group in day.groups() {
                prop_assert!(group.records.windows(2).all(|w| index_of(&w[0]) < index_of(&w[1])));
                prop_assert!(group.records.iter().all(|o| o.group_name == group.name && o.date == day.date));
            }
        }
    }

    #[test]
    fn flatten_restores_input_multiset(orders in arb_orders()) {
        prop_assert_eq!(multiset(&flatten(&aggregate_by_day(&orders))), multiset(&orders));
        prop_assert_eq!(multiset(&flatten(&aggregate_by_day_and_group(&orders))), multiset(&orders));
    }

    #[test]
    fn toggle_is_an_involution(day in 1u32..=30, group in "[а-я]{0,8}", seed in any::<bool>()) {
        let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        for key in [NodeKey::Day(date), NodeKey::Group(date, group.clone())] {
            let mut state = CollapseState::default();
            state.seed(key.clone(), seed);
            let before = state.is_collapsed(&key);
            state.toggle(key.clone());
            prop_assert_ne!(state.is_collapsed(&key), before);
            state.toggle(key.clone());
            prop_assert_eq!(state.is_collapsed(&key), before);
        }
    }

    #[test]
    fn balances_are_prefix_sums(orders in arb_orders(), opening in (-10_000_000i64..10_000_000i64).prop_map(|c| Money::new(c, 2))) {
        let days = aggregate_by_day_and_group(&orders);
        let balances = running_balances(&days, opening);

        let mut expected = vec![opening];
        let mut running = opening;
        for day in &days {
            running += day.records().map(LedgerEntry::net).sum::<Money>();
            expected.push(running);
        }
        prop_assert_eq!(balances.cumulative(), expected);

        let total: Money = orders.iter().map(LedgerEntry::net).sum();
        prop_assert_eq!(balances.current(), opening + total);
    }
}
