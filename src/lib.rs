#![warn(missing_docs)]
//! Модель данных финансового дашборда: банковские выписки, заказы 1С и
//! ежедневный отчёт, разложенные по дням и группам, со свёрнутостью узлов
//! и нарастающим остатком.

mod aggregate;
mod collapse;
mod config;
mod daily;
mod error;
mod parser;
mod raw;
mod report;
mod status;
mod totals;
mod types;
mod utils;
mod view;

pub use crate::aggregate::{aggregate_by_day, aggregate_by_day_and_group, flatten};
pub use crate::collapse::{CollapseState, FeedKind, SourceId};
pub use crate::config::{
    CollapseConfig, CollapsePolicy, DashboardConfig, IngestConfig, InvalidRecordPolicy,
};
pub use crate::daily::{DailySummary, opening_balance};
pub use crate::error::DashboardError;
pub use crate::parser::Ingested;
pub use crate::raw::RawFeed;
pub use crate::report::{LedgerTable, Report, ReportBuilder, ReportStatus};
pub use crate::status::{FeedStatus, SyncResponse, SyncState, sync_status};
pub use crate::totals::{Balances, DayBalance, Totals, running_balances};
pub use crate::types::*;
pub use crate::utils::{DateFormat, format_money, parse_date};
pub use crate::view::{VisibleRow, visible_rows};
