//! Сборка плоских записей в дерево «день → [группа] → запись».

use std::collections::HashMap;

use crate::types::{Classified, DayContent, DayNode, GroupNode, LedgerEntry};
use crate::utils::day_label;
use tracing::debug;

/// Раскладывает записи по дням без промежуточных групп.
///
/// Дни идут по возрастанию даты, записи одного дня сохраняют исходный
/// порядок. Входные записи не изменяются.
pub fn aggregate_by_day<T>(records: &[T]) -> Vec<DayNode<T>>
where
    T: LedgerEntry + Clone,
{
    let mut days: Vec<DayNode<T>> = Vec::new();

    for record in sorted_by_date(records) {
        match days.last_mut() {
            Some(DayNode {
                date,
                content: DayContent::Records(day_records),
                ..
            }) if *date == record.date() => day_records.push(record.clone()),
            _ => days.push(DayNode {
                date: record.date(),
                label: day_label(record.date_label()).to_string(),
                content: DayContent::Records(vec![record.clone()]),
            }),
        }
    }

    debug!(records = records.len(), days = days.len(), "records grouped by day");
    days
}

/// Раскладывает записи по дням и внутри дня по группам.
///
/// Группы внутри дня идут в порядке первого появления, записи внутри
/// группы сохраняют исходный порядок.
pub fn aggregate_by_day_and_group<T>(records: &[T]) -> Vec<DayNode<T>>
where
    T: LedgerEntry + Classified + Clone,
{
    let mut days: Vec<DayNode<T>> = Vec::new();
    // Индекс группы внутри текущего дня.
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for record in sorted_by_date(records) {
        let same_day = days.last().is_some_and(|day| day.date == record.date());
        if !same_day {
            group_index.clear();
            days.push(DayNode {
                date: record.date(),
                label: day_label(record.date_label()).to_string(),
                content: DayContent::Groups(Vec::new()),
            });
        }

        let Some(DayNode {
            content: DayContent::Groups(groups),
            ..
        }) = days.last_mut()
        else {
            continue;
        };

        let name = record.group_name();
        if let Some(&index) = group_index.get(name) {
            groups[index].records.push(record.clone());
        } else {
            group_index.insert(name.to_string(), groups.len());
            groups.push(GroupNode {
                name: name.to_string(),
                records: vec![record.clone()],
            });
        }
    }

    debug!(records = records.len(), days = days.len(), "records grouped by day and group");
    days
}

/// Обратная операция: все записи дерева в порядке вывода.
pub fn flatten<T: Clone>(days: &[DayNode<T>]) -> Vec<T> {
    days.iter().flat_map(DayNode::records).cloned().collect()
}

/// Стабильная сортировка ссылок по дате: записи одного дня не переставляются.
fn sorted_by_date<T: LedgerEntry>(records: &[T]) -> Vec<&T> {
    let mut sorted: Vec<&T> = records.iter().collect();
    sorted.sort_by_key(|record| record.date());
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BankTransaction, Money, SalesOrder};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn tx(day: u32, purpose: &str) -> BankTransaction {
        BankTransaction {
            date: date(day),
            date_label: date(day).to_string(),
            debit: None,
            credit: Some(dec!(1)),
            inn: None,
            counterparty: None,
            account: None,
            purpose: Some(purpose.to_string()),
            category: None,
            document_type: None,
            day_collapsed: None,
        }
    }

    fn order(day: u32, group: &str, id: &str, credit: Money) -> SalesOrder {
        SalesOrder {
            date: date(day),
            date_label: date(day).to_string(),
            group_name: group.to_string(),
            order_id: id.to_string(),
            debit: None,
            credit: Some(credit),
            counterparty: String::new(),
            manager: String::new(),
            product: String::new(),
            cost: Money::ZERO,
            gross_profit: Money::ZERO,
            payment_method: None,
        }
    }

    #[test]
    fn empty_input_gives_no_days() {
        assert!(aggregate_by_day::<BankTransaction>(&[]).is_empty());
        assert!(aggregate_by_day_and_group::<SalesOrder>(&[]).is_empty());
    }

    #[test]
    fn days_are_sorted_and_same_day_order_is_kept() {
        let input = vec![tx(3, "c1"), tx(1, "a1"), tx(3, "c2"), tx(1, "a2"), tx(2, "b1")];
        let days = aggregate_by_day(&input);

        let dates: Vec<_> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3)]);

        let purposes: Vec<_> = flatten(&days)
            .into_iter()
            .filter_map(|t| t.purpose)
            .collect();
        assert_eq!(purposes, vec!["a1", "a2", "b1", "c1", "c2"]);
        assert!(days.iter().all(|d| d.groups().is_empty()));
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let input = vec![
            order(1, "Плитка", "1", dec!(10)),
            order(1, "Сантехника", "2", dec!(20)),
            order(2, "Сантехника", "3", dec!(30)),
            order(1, "Плитка", "4", dec!(40)),
        ];
        let days = aggregate_by_day_and_group(&input);
        assert_eq!(days.len(), 2);

        let first = days[0].groups();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "Плитка");
        let ids: Vec<_> = first[0].records.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(first[1].name, "Сантехника");

        assert_eq!(days[1].groups().len(), 1);
        assert_eq!(days[1].groups()[0].records[0].order_id, "3");
    }

    #[test]
    fn aggregation_is_idempotent_and_leaves_input_alone() {
        let input = vec![tx(2, "b"), tx(1, "a")];
        let before = input.clone();
        assert_eq!(aggregate_by_day(&input), aggregate_by_day(&input));
        assert_eq!(input, before);
    }

    #[test]
    fn day_label_comes_from_source() {
        let mut record = tx(5, "x");
        record.date_label = "05.06.2025".to_string();
        let days = aggregate_by_day(&[record]);
        assert_eq!(days[0].label, "05.06.2025");
    }

    #[test]
    fn datetime_label_keeps_only_the_day() {
        let mut later = order(1, "Плитка", "2", dec!(1));
        later.date_label = "2025-06-01T18:40:00".to_string();
        let mut earlier = order(1, "Плитка", "1", dec!(1));
        earlier.date_label = "2025-06-01T10:15:00".to_string();
        let input = [later, earlier];

        assert_eq!(aggregate_by_day(&input)[0].label, "2025-06-01");
        assert_eq!(aggregate_by_day_and_group(&input)[0].label, "2025-06-01");
        assert_eq!(input[0].date_label, "2025-06-01T18:40:00");
    }
}
