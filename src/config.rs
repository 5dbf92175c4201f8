//! Настройки дашборда: стартовый остаток, политика валидации, свёрнутость таблиц.

use crate::error::DashboardError;
use crate::types::Money;
use serde::Deserialize;
use std::path::Path;

/// Настройки дашборда, читаются из TOML.
///
/// ```toml
/// starting_balance = "100000.00"
///
/// [ingest]
/// on_invalid_record = "skip"
///
/// [collapse.sales]
/// groups_collapsed = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Остаток на начало периода для банковской выписки.
    pub starting_balance: Money,
    /// Настройки загрузки фидов.
    pub ingest: IngestConfig,
    /// Свёрнутость по умолчанию для каждой таблицы.
    pub collapse: CollapseConfig,
}

/// Настройки загрузки фидов.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Что делать с записью, не прошедшей валидацию.
    pub on_invalid_record: InvalidRecordPolicy,
}

/// Политика для некорректных записей фида.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRecordPolicy {
    /// Первая некорректная запись проваливает весь фид.
    #[default]
    Reject,
    /// Некорректная запись отбрасывается с предупреждением в лог.
    Skip,
}

/// Свёрнутость по умолчанию для узлов, которые пользователь ещё не трогал.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollapsePolicy {
    /// Дни свёрнуты.
    pub days_collapsed: bool,
    /// Группы свёрнуты.
    pub groups_collapsed: bool,
}

/// Политики свёрнутости по таблицам.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    /// Банковская выписка.
    pub bank: CollapsePolicy,
    /// Заказы 1С.
    pub sales: CollapsePolicy,
    /// Ежедневный отчёт.
    pub daily: CollapsePolicy,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            bank: CollapsePolicy::default(),
            sales: CollapsePolicy::default(),
            // Ежедневный отчёт открывается со свёрнутыми юрлицами.
            daily: CollapsePolicy {
                days_collapsed: false,
                groups_collapsed: true,
            },
        }
    }
}

impl DashboardConfig {
    /// Разбирает настройки из TOML-строки.
    pub fn from_toml_str(s: &str) -> Result<Self, DashboardError> {
        Ok(toml::from_str(s)?)
    }

    /// Читает настройки из файла.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_config_uses_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.ingest.on_invalid_record, InvalidRecordPolicy::Reject);
        assert!(config.collapse.daily.groups_collapsed);
        assert!(!config.collapse.sales.groups_collapsed);
    }

    #[test]
    fn reads_all_sections() {
        let config = DashboardConfig::from_toml_str(
            r#"
            starting_balance = "100000.50"

            [ingest]
            on_invalid_record = "skip"

            [collapse.bank]
            days_collapsed = true

            [collapse.sales]
            groups_collapsed = true
            "#,
        )
        .unwrap();
        assert_eq!(config.starting_balance, dec!(100000.50));
        assert_eq!(config.ingest.on_invalid_record, InvalidRecordPolicy::Skip);
        assert!(config.collapse.bank.days_collapsed);
        assert!(config.collapse.sales.groups_collapsed);
        assert!(config.collapse.daily.groups_collapsed);
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        let err = DashboardConfig::from_toml_str("[ingest]\non_invalid_record = \"ignore\"")
            .unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
