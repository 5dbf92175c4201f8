//! Ежедневный отчёт: движение денег по юрлицам за каждый день.

use std::collections::HashMap;

use crate::collapse::{CollapseState, SourceId};
use crate::config::CollapsePolicy;
use crate::report::LedgerTable;
use crate::types::{
    BankOperation, ColumnData, DailyDay, DayNode, EntitySummary, GroupNode, Money,
    MonthlyBalance, OperationKind,
};
use crate::utils::entity_kind;
use chrono::NaiveDate;

/// Ежедневный отчёт со стартовым и текущим остатком.
#[derive(Debug, Clone)]
pub struct DailySummary {
    table: LedgerTable<BankOperation>,
    days: Vec<DailyDay>,
}

impl DailySummary {
    /// Строит отчёт по операциям и остатку на начало месяца.
    pub fn build(
        source: SourceId,
        operations: &[BankOperation],
        opening: Money,
        policy: CollapsePolicy,
    ) -> Self {
        let table = LedgerTable::grouped(source, operations, opening, policy);
        let days = table.days().iter().map(daily_day).collect();
        Self { table, days }
    }

    pub(crate) fn with_skipped(self, skipped: usize) -> Self {
        Self {
            table: self.table.with_skipped(skipped),
            days: self.days,
        }
    }

    /// Дни с юрлицами.
    #[inline]
    pub fn days(&self) -> &[DailyDay] {
        &self.days
    }

    /// Дерево операций, по которому строятся дни; ключи свёрнутости берутся отсюда.
    #[inline]
    pub const fn table(&self) -> &LedgerTable<BankOperation> {
        &self.table
    }

    /// Сумма на начало месяца.
    #[inline]
    pub const fn start_balance(&self) -> Money {
        self.table.balances().opening
    }

    /// Текущая сумма: начало месяца плюс все поступления минус все расходы.
    #[inline]
    pub fn current_balance(&self) -> Money {
        self.table.current_balance()
    }

    /// Состояние свёрнутости для дней и юрлиц отчёта.
    #[inline]
    pub fn collapse_state(&self) -> CollapseState {
        self.table.collapse_state()
    }
}

/// Остаток на начало месяца на дату `as_of`.
///
/// У каждого юрлица берётся последняя строка, датированная не позже
/// `as_of`; остатки юрлиц складываются. `organization` оставляет одно юрлицо.
pub fn opening_balance(
    balances: &[MonthlyBalance],
    organization: Option<&str>,
    as_of: NaiveDate,
) -> Money {
    let mut latest: HashMap<&str, &MonthlyBalance> = HashMap::new();
    for row in balances
        .iter()
        .filter(|b| b.date <= as_of)
        .filter(|b| organization.is_none_or(|name| b.organization == name))
    {
        latest
            .entry(row.organization.as_str())
            .and_modify(|current| {
                if row.date >= current.date {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    latest.values().map(|b| b.balance).sum()
}

fn daily_day(node: &DayNode<BankOperation>) -> DailyDay {
    DailyDay {
        date: node.date,
        label: node.label.clone(),
        entities: node.groups().iter().map(entity_summary).collect(),
    }
}

fn entity_summary(group: &GroupNode<BankOperation>) -> EntitySummary {
    EntitySummary {
        name: group.name.clone(),
        kind: entity_kind(&group.name),
        money_in: column(&group.records, OperationKind::Income),
        money_out: column(&group.records, OperationKind::Expense),
    }
}

/// Итог и детализация по способам; нулевые способы не выводятся.
fn column(operations: &[BankOperation], kind: OperationKind) -> ColumnData {
    let mut data = ColumnData::default();
    for op in operations.iter().filter(|op| op.operation == kind) {
        data.total += op.amount;
        match data.details.iter_mut().find(|(method, _)| *method == op.method) {
            Some((_, amount)) => *amount += op.amount,
            None => data.details.push((op.method.clone(), op.amount)),
        }
    }
    data.details.retain(|(_, amount)| !amount.is_zero());
    data
}
