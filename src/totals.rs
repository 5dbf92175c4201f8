//! Итоги узлов и нарастающий остаток по дням.

use std::ops::AddAssign;

use crate::types::{DayNode, GroupNode, LedgerEntry, Money};
use chrono::NaiveDate;
use tracing::debug;

/// Суммы дебета и кредита по набору записей.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Сумма списаний.
    pub debit: Money,
    /// Сумма поступлений.
    pub credit: Money,
}

impl Totals {
    /// Складывает суммы записей.
    pub fn of<'a, T, I>(records: I) -> Self
    where
        T: LedgerEntry + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut totals = Self::default();
        for record in records {
            totals += record;
        }
        totals
    }

    /// Кредит минус дебет.
    #[inline]
    pub fn net(&self) -> Money {
        self.credit - self.debit
    }
}

impl<T: LedgerEntry> AddAssign<&T> for Totals {
    fn add_assign(&mut self, record: &T) {
        self.debit += record.debit().unwrap_or_default();
        self.credit += record.credit().unwrap_or_default();
    }
}

impl<T: LedgerEntry> GroupNode<T> {
    /// Итоги группы; от свёрнутости не зависят.
    pub fn totals(&self) -> Totals {
        Totals::of(&self.records)
    }
}

impl<T: LedgerEntry> DayNode<T> {
    /// Итоги дня по всем группам и записям.
    pub fn totals(&self) -> Totals {
        Totals::of(self.records())
    }

    /// Изменение остатка за день.
    #[inline]
    pub fn net_change(&self) -> Money {
        self.totals().net()
    }
}

/// Остаток на конец одного дня.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBalance {
    /// День.
    pub date: NaiveDate,
    /// Изменение за день.
    pub net_change: Money,
    /// Остаток на конец дня.
    pub closing: Money,
}

/// Нарастающие остатки по дням.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balances {
    /// Остаток на начало периода.
    pub opening: Money,
    /// Остатки по дням в порядке дней.
    pub days: Vec<DayBalance>,
}

impl Balances {
    /// Считает остатки по изменениям за каждый день.
    pub fn from_changes<I>(opening: Money, changes: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Money)>,
    {
        let mut closing = opening;
        let days: Vec<DayBalance> = changes
            .into_iter()
            .map(|(date, net_change)| {
                closing += net_change;
                DayBalance {
                    date,
                    net_change,
                    closing,
                }
            })
            .collect();
        debug!(days = days.len(), %opening, %closing, "balances computed");
        Self { opening, days }
    }

    /// Текущий остаток: на конец последнего дня или стартовый, если дней нет.
    pub fn current(&self) -> Money {
        self.days.last().map_or(self.opening, |day| day.closing)
    }

    /// Ряд `B, B+d1, B+d1+d2, ...` со стартовым остатком в начале.
    pub fn cumulative(&self) -> Vec<Money> {
        std::iter::once(self.opening)
            .chain(self.days.iter().map(|day| day.closing))
            .collect()
    }

    /// Остаток на конец указанного дня.
    pub fn closing_on(&self, date: NaiveDate) -> Option<Money> {
        self.days
            .iter()
            .find(|day| day.date == date)
            .map(|day| day.closing)
    }
}

/// Нарастающий остаток по дереву дней. Пересчитывается целиком.
pub fn running_balances<T: LedgerEntry>(days: &[DayNode<T>], opening: Money) -> Balances {
    Balances::from_changes(opening, days.iter().map(|day| (day.date, day.net_change())))
}
