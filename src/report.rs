//! Сборка таблиц дашборда из сырых фидов.

use crate::aggregate::{aggregate_by_day, aggregate_by_day_and_group};
use crate::collapse::{CollapseState, FeedKind, SourceId};
use crate::config::{CollapsePolicy, DashboardConfig};
use crate::daily::{DailySummary, opening_balance};
use crate::error::DashboardError;
use crate::parser::Ingested;
use crate::raw::RawFeed;
use crate::status::FeedStatus;
use crate::totals::{Balances, running_balances};
use crate::types::{BankTransaction, Classified, DayNode, LedgerEntry, Money, SalesOrder};
use crate::view::{VisibleRow, visible_rows};
use chrono::NaiveDate;
use tracing::warn;

/// Таблица «день → [группа] → запись» с посчитанными остатками.
///
/// Остатки считаются один раз при построении и живут вместе с деревом.
#[derive(Debug, Clone)]
pub struct LedgerTable<T> {
    source: SourceId,
    policy: CollapsePolicy,
    days: Vec<DayNode<T>>,
    balances: Balances,
    skipped: usize,
}

impl<T: LedgerEntry + Clone> LedgerTable<T> {
    /// Таблица без групп: день → запись.
    pub fn flat(source: SourceId, records: &[T], opening: Money, policy: CollapsePolicy) -> Self {
        Self::from_days(source, aggregate_by_day(records), opening, policy)
    }

    fn from_days(
        source: SourceId,
        days: Vec<DayNode<T>>,
        opening: Money,
        policy: CollapsePolicy,
    ) -> Self {
        let balances = running_balances(&days, opening);
        Self {
            source,
            policy,
            days,
            balances,
            skipped: 0,
        }
    }

    pub(crate) fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    /// Дни по возрастанию даты.
    #[inline]
    pub fn days(&self) -> &[DayNode<T>] {
        &self.days
    }

    /// Остатки по дням.
    #[inline]
    pub const fn balances(&self) -> &Balances {
        &self.balances
    }

    /// Текущий остаток для шапки.
    #[inline]
    pub fn current_balance(&self) -> Money {
        self.balances.current()
    }

    /// Источник данных таблицы.
    #[inline]
    pub const fn source(&self) -> SourceId {
        self.source
    }

    /// Сколько записей отброшено при загрузке.
    #[inline]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Новое состояние свёрнутости, привязанное к источнику таблицы.
    /// Дни, для которых источник прислал `isCollapsed`, получают его как умолчание.
    pub fn collapse_state(&self) -> CollapseState {
        let mut state = CollapseState::new(self.policy);
        self.sync_collapse(&mut state);
        state
    }

    /// Привязывает существующее состояние к этой таблице.
    /// Возвращает `true`, если состояние сброшено из-за смены источника.
    pub fn sync_collapse(&self, state: &mut CollapseState) -> bool {
        let reset = state.attach(self.source);
        for day in &self.days {
            if let Some(collapsed) = day.records().find_map(LedgerEntry::day_collapsed) {
                state.seed(day.key(), collapsed);
            }
        }
        reset
    }

    /// Видимые строки при заданной свёрнутости.
    pub fn visible_rows<'a>(&'a self, state: &CollapseState) -> Vec<VisibleRow<'a, T>> {
        visible_rows(&self.days, state)
    }
}

impl<T: LedgerEntry + Classified + Clone> LedgerTable<T> {
    /// Таблица с группами: день → группа → запись.
    pub fn grouped(
        source: SourceId,
        records: &[T],
        opening: Money,
        policy: CollapsePolicy,
    ) -> Self {
        Self::from_days(source, aggregate_by_day_and_group(records), opening, policy)
    }
}

/// Набор флагов, определяющий, какие таблицы строить (внутренний тип).
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuildOptions {
    pub build_bank: bool,
    pub build_sales: bool,
    pub build_daily: bool,
}

impl BuildOptions {
    /// Строит все таблицы.
    pub const fn everything() -> Self {
        Self {
            build_bank: true,
            build_sales: true,
            build_daily: true,
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::everything()
    }
}

/// Статусы загрузки по таблицам.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStatus {
    /// Банковская выписка.
    pub bank: FeedStatus,
    /// Заказы 1С.
    pub sales: FeedStatus,
    /// Ежедневный отчёт.
    pub daily: FeedStatus,
}

/// Все таблицы дашборда.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Банковская выписка.
    pub bank: Option<LedgerTable<BankTransaction>>,
    /// Заказы 1С.
    pub sales: Option<LedgerTable<SalesOrder>>,
    /// Ежедневный отчёт.
    pub daily: Option<DailySummary>,
    /// Чем закончилась загрузка каждой таблицы.
    pub status: ReportStatus,
}

/// Builder для сборки `Report` из доступных фидов.
pub struct ReportBuilder<'a> {
    config: &'a DashboardConfig,
    bank_feed: Option<&'a RawFeed>,
    sales_feed: Option<&'a RawFeed>,
    operations_feed: Option<&'a RawFeed>,
    balances_feed: Option<&'a RawFeed>,
    period: Option<(NaiveDate, NaiveDate)>,
    options: BuildOptions,
}

impl<'a> ReportBuilder<'a> {
    /// Создаёт builder с настройками дашборда.
    ///
    /// # Пример
    ///
    /// ```
    /// # use cashflow_dashboard::{DashboardConfig, RawFeed, ReportBuilder};
    /// let config = DashboardConfig::default();
    /// let bank = RawFeed::from_str(r#"[{"date": "2025-06-01", "credit": 100}]"#);
    /// let report = ReportBuilder::new(&config)
    ///     .bank_feed(&bank)
    ///     .sales(false)
    ///     .build();
    /// assert!(report.bank.is_some());
    /// assert!(report.sales.is_none());
    /// ```
    #[inline]
    pub const fn new(config: &'a DashboardConfig) -> Self {
        Self {
            config,
            bank_feed: None,
            sales_feed: None,
            operations_feed: None,
            balances_feed: None,
            period: None,
            options: BuildOptions::everything(),
        }
    }

    /// Ответ сервиса банковских выписок.
    #[inline]
    pub const fn bank_feed(mut self, feed: &'a RawFeed) -> Self {
        self.bank_feed = Some(feed);
        self
    }

    /// Ответ сервиса заказов 1С.
    #[inline]
    pub const fn sales_feed(mut self, feed: &'a RawFeed) -> Self {
        self.sales_feed = Some(feed);
        self
    }

    /// Ответ со сводными банковскими операциями для ежедневного отчёта.
    #[inline]
    pub const fn operations_feed(mut self, feed: &'a RawFeed) -> Self {
        self.operations_feed = Some(feed);
        self
    }

    /// Ответ с остатками на начало месяца.
    #[inline]
    pub const fn balances_feed(mut self, feed: &'a RawFeed) -> Self {
        self.balances_feed = Some(feed);
        self
    }

    /// Период, за который запрошены данные. Смена периода сбрасывает свёрнутость.
    #[inline]
    pub const fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some((start, end));
        self
    }

    /// Включает или отключает банковскую выписку.
    #[inline]
    pub const fn bank(mut self, enabled: bool) -> Self {
        self.options.build_bank = enabled;
        self
    }

    /// Включает или отключает таблицу заказов.
    #[inline]
    pub const fn sales(mut self, enabled: bool) -> Self {
        self.options.build_sales = enabled;
        self
    }

    /// Включает или отключает ежедневный отчёт.
    #[inline]
    pub const fn daily(mut self, enabled: bool) -> Self {
        self.options.build_daily = enabled;
        self
    }

    /// Строит таблицы. Ошибка одного фида не мешает остальным:
    /// она попадает в статус таблицы.
    pub fn build(self) -> Report {
        let policy = self.config.ingest.on_invalid_record;
        let collapse = self.config.collapse;

        let (bank, bank_status) = build_optional(
            self.options.build_bank,
            self.bank_feed,
            "bank",
            |feed| {
                let Ingested { records, skipped } = feed.bank_transactions(policy)?;
                let table = LedgerTable::flat(
                    self.source(FeedKind::Bank),
                    &records,
                    self.config.starting_balance,
                    collapse.bank,
                );
                Ok((table.with_skipped(skipped), records.len()))
            },
        );

        let (sales, sales_status) = build_optional(
            self.options.build_sales,
            self.sales_feed,
            "sales",
            |feed| {
                let Ingested { records, skipped } = feed.sales_orders(policy)?;
                let table = LedgerTable::grouped(
                    self.source(FeedKind::Sales),
                    &records,
                    Money::ZERO,
                    collapse.sales,
                );
                Ok((table.with_skipped(skipped), records.len()))
            },
        );

        let (daily, daily_status) = build_optional(
            self.options.build_daily,
            self.operations_feed,
            "daily",
            |feed| {
                let Ingested { records, skipped } = feed.bank_operations(policy)?;
                let opening = match self.balances_feed {
                    Some(balances) => {
                        // Остаток на начало периода, а без периода на первый день операций.
                        let as_of = self
                            .period
                            .map(|(start, _)| start)
                            .or_else(|| records.iter().map(|op| op.date).min())
                            .unwrap_or(NaiveDate::MAX);
                        let rows = balances.monthly_balances(policy)?.records;
                        opening_balance(&rows, None, as_of)
                    }
                    None => self.config.starting_balance,
                };
                let summary = DailySummary::build(
                    self.source(FeedKind::Daily),
                    &records,
                    opening,
                    collapse.daily,
                );
                Ok((summary.with_skipped(skipped), records.len()))
            },
        );

        Report {
            bank,
            sales,
            daily,
            status: ReportStatus {
                bank: bank_status,
                sales: sales_status,
                daily: daily_status,
            },
        }
    }

    fn source(&self, feed: FeedKind) -> SourceId {
        match self.period {
            Some((start, end)) => SourceId::with_period(feed, start, end),
            None => SourceId::new(feed),
        }
    }
}

/// Строит таблицу, если она включена и фид передан.
/// Отсутствие фида нормально: таблица просто не показывается.
fn build_optional<T, F>(
    enabled: bool,
    feed: Option<&RawFeed>,
    table: &'static str,
    builder: F,
) -> (Option<T>, FeedStatus)
where
    F: FnOnce(&RawFeed) -> Result<(T, usize), DashboardError>,
{
    let Some(feed) = feed.filter(|_| enabled) else {
        return (None, FeedStatus::Idle);
    };
    let result = builder(feed);
    let status = FeedStatus::from_result(&result, |(_, records)| *records);
    match result {
        Ok((value, _)) => (Some(value), status),
        Err(err) => {
            warn!(table, error = %err, "table not built");
            (None, status)
        }
    }
}
