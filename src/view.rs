//! Обход дерева для отрисовки: какие строки видны при текущей свёрнутости.

use crate::collapse::CollapseState;
use crate::types::{DayContent, DayNode, GroupNode};

/// Видимая строка таблицы.
#[derive(Debug, PartialEq, Eq)]
pub enum VisibleRow<'a, T> {
    /// Заголовок дня.
    Day {
        /// Узел дня.
        day: &'a DayNode<T>,
        /// Свёрнут ли день.
        collapsed: bool,
    },
    /// Заголовок группы.
    Group {
        /// День, которому принадлежит группа.
        day: &'a DayNode<T>,
        /// Узел группы.
        group: &'a GroupNode<T>,
        /// Свёрнута ли группа.
        collapsed: bool,
    },
    /// Строка записи.
    Record(&'a T),
}

/// Строки, которые увидит пользователь.
///
/// Свёрнутый день скрывает группы и записи, но их собственная
/// свёрнутость сохраняется и проявится после разворота дня.
pub fn visible_rows<'a, T>(
    days: &'a [DayNode<T>],
    collapse: &CollapseState,
) -> Vec<VisibleRow<'a, T>> {
    let mut rows = Vec::new();
    for day in days {
        let collapsed = collapse.is_collapsed(&day.key());
        rows.push(VisibleRow::Day { day, collapsed });
        if collapsed {
            continue;
        }
        match &day.content {
            DayContent::Records(records) => rows.extend(records.iter().map(VisibleRow::Record)),
            DayContent::Groups(groups) => {
                for group in groups {
                    let collapsed = collapse.is_collapsed(&day.group_key(group));
                    rows.push(VisibleRow::Group {
                        day,
                        group,
                        collapsed,
                    });
                    if !collapsed {
                        rows.extend(group.records.iter().map(VisibleRow::Record));
                    }
                }
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_by_day_and_group;
    use crate::types::{Money, NodeKey, SalesOrder};
    use chrono::NaiveDate;

    fn order(day: u32, group: &str, id: &str) -> SalesOrder {
        let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        SalesOrder {
            date,
            date_label: date.to_string(),
            group_name: group.to_string(),
            order_id: id.to_string(),
            debit: None,
            credit: None,
            counterparty: String::new(),
            manager: String::new(),
            product: String::new(),
            cost: Money::ZERO,
            gross_profit: Money::ZERO,
            payment_method: None,
        }
    }

    fn shape(rows: &[VisibleRow<'_, SalesOrder>]) -> Vec<String> {
        rows.iter()
            .map(|row| match row {
                VisibleRow::Day { day, .. } => format!("D{}", day.date.format("%d")),
                VisibleRow::Group { group, .. } => format!("G{}", group.name),
                VisibleRow::Record(order) => format!("R{}", order.order_id),
            })
            .collect()
    }

    #[test]
    fn collapsed_nodes_hide_descendants_only() {
        let days = aggregate_by_day_and_group(&[
            order(1, "a", "1"),
            order(1, "b", "2"),
            order(2, "a", "3"),
        ]);
        let mut state = CollapseState::default();
        assert_eq!(
            shape(&visible_rows(&days, &state)),
            vec!["D01", "Ga", "R1", "Gb", "R2", "D02", "Ga", "R3"]
        );

        let d1 = days[0].date;
        state.toggle(NodeKey::Group(d1, "a".into()));
        assert_eq!(
            shape(&visible_rows(&days, &state)),
            vec!["D01", "Ga", "Gb", "R2", "D02", "Ga", "R3"]
        );

        state.toggle(NodeKey::Day(d1));
        assert_eq!(
            shape(&visible_rows(&days, &state)),
            vec!["D01", "D02", "Ga", "R3"]
        );

        // Группа остаётся свёрнутой после разворота дня.
        state.toggle(NodeKey::Day(d1));
        assert_eq!(
            shape(&visible_rows(&days, &state)),
            vec!["D01", "Ga", "Gb", "R2", "D02", "Ga", "R3"]
        );
    }
}
