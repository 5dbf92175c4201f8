//! Вспомогательные парсеры дат, сумм и форматирование денег.

use crate::error::DashboardError;
use crate::types::{EntityKind, Money};
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString as _};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::LazyLock;

/// Семейство форматов, в которых источники присылают даты.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `2025-06-01`.
    Iso,
    /// `2025-06-01T10:15:00`, время отбрасывается.
    IsoDateTime,
    /// `01.06.2025`.
    Dotted,
    /// `01.06.25`.
    DottedShort,
}

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso regex"));
static ISO_DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})[T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$")
        .expect("valid iso datetime regex")
});
static DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid dotted regex"));
static DOTTED_SHORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{2}$").expect("valid short dotted regex"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(ИП|ООО)").expect("valid entity regex"));

/// Нормализует последовательность символов, схлопывая группы пробельных.
fn normalize_chars<I: IntoIterator<Item = char>>(iter: I) -> String {
    let mut output = String::new();
    let mut prev_space = false;
    for ch in iter {
        let is_space = ch.is_whitespace();
        if is_space {
            if !prev_space {
                output.push(' ');
            }
        } else {
            output.push(ch);
        }
        prev_space = is_space;
    }
    output.trim().to_string()
}

/// Приводит необязательное текстовое поле к виду без лишних пробелов.
/// Пустая строка считается отсутствующим значением.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| normalize_chars(s.chars()))
        .filter(|s| !s.is_empty())
}

/// Разбирает дату и определяет семейство её формата.
pub fn parse_date(value: &str) -> Result<(NaiveDate, DateFormat), DashboardError> {
    let trimmed = value.trim();
    let invalid = || DashboardError::InvalidDate {
        value: trimmed.to_string(),
    };

    let (text, pattern, format) = if ISO_RE.is_match(trimmed) {
        (trimmed, "%Y-%m-%d", DateFormat::Iso)
    } else if let Some(caps) = ISO_DATETIME_RE.captures(trimmed) {
        let date_part = caps.get(1).map_or(trimmed, |m| m.as_str());
        (date_part, "%Y-%m-%d", DateFormat::IsoDateTime)
    } else if DOTTED_RE.is_match(trimmed) {
        (trimmed, "%d.%m.%Y", DateFormat::Dotted)
    } else if DOTTED_SHORT_RE.is_match(trimmed) {
        (trimmed, "%d.%m.%y", DateFormat::DottedShort)
    } else {
        return Err(invalid());
    };

    let date = NaiveDate::parse_from_str(text, pattern).map_err(|_| invalid())?;
    Ok((date, format))
}

/// Подпись дня: у даты со временем остаётся только дата.
pub fn day_label(label: &str) -> &str {
    let trimmed = label.trim();
    ISO_DATETIME_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str())
}

/// Нормализует числовую строку: убирает пробелы и плюс, приводит запятую к точке.
fn normalize_number(input: &str) -> String {
    let compact: String = input
        .chars()
        .filter(|ch| !matches!(*ch, ' ' | '\u{a0}' | '\u{202f}' | '+'))
        .collect();
    if compact.contains('.') {
        compact.replace(',', "")
    } else {
        compact.replace(',', ".")
    }
}

/// Разбирает сумму и округляет её до копеек. Пустая строка даёт `None`.
pub fn parse_amount(value: &str, field: &'static str) -> Result<Option<Money>, DashboardError> {
    let normalized = normalize_number(value.trim());
    if normalized.is_empty() {
        return Ok(None);
    }
    let amount = Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|_| DashboardError::InvalidAmount {
            value: value.trim().to_string(),
            field,
        })?;
    Ok(Some(amount.round_dp_with_strategy(
        2,
        RoundingStrategy::MidpointAwayFromZero,
    )))
}

/// Проверяет, что дебет или кредит не отрицательны.
pub fn non_negative(
    amount: Option<Money>,
    field: &'static str,
) -> Result<Option<Money>, DashboardError> {
    match amount {
        Some(value) if value.is_sign_negative() && !value.is_zero() => {
            Err(DashboardError::NegativeAmount {
                value: value.to_string(),
                field,
            })
        }
        other => Ok(other),
    }
}

/// Определяет форму юрлица по префиксу названия.
pub fn entity_kind(name: &str) -> EntityKind {
    match ENTITY_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
        .as_deref()
    {
        Some("ИП") => EntityKind::Individual,
        Some("ООО") => EntityKind::Company,
        _ => EntityKind::Other,
    }
}

/// Форматирует сумму для таблицы: `1 234 567,89`.
/// Пустое значение и ноль выводятся пустой строкой.
pub fn format_money(value: Option<Money>) -> String {
    let Some(value) = value.filter(|v| !v.is_zero()) else {
        return String::new();
    };
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let grouped = int_part
        .parse::<u128>()
        .map_or_else(|_| int_part.to_string(), |n| n.to_formatted_string(&Locale::ru));

    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}
