//! Сырые ответы сервисов: JSON-текст и его форма до валидации.

use crate::error::DashboardError;
use serde::Deserialize;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use std::io::Read;

/// Исходный JSON-ответ сервиса без разбора.
#[derive(Debug, Clone)]
pub struct RawFeed {
    /// Полный текст ответа.
    pub json: String,
}

impl RawFeed {
    /// Читает ответ из произвольного `Read`.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, DashboardError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Ok(Self { json })
    }

    /// Создаёт фид из готовой строки.
    #[inline]
    pub fn from_str(s: &str) -> Self {
        Self {
            json: s.to_string(),
        }
    }

    /// Разбирает массив записей: голый или обёрнутый в `{"data": [...]}`.
    ///
    /// Строки остаются `Value`: каждая проверяется отдельно, чтобы одна
    /// битая запись не роняла весь фид при политике `skip`.
    pub(crate) fn rows(&self) -> Result<Vec<Value>, DashboardError> {
        match serde_json::from_str::<Value>(&self.json)? {
            Value::Array(rows) => Ok(rows),
            Value::Object(mut envelope) => match envelope.remove("data") {
                Some(Value::Array(rows)) => Ok(rows),
                _ => Err(not_an_array()),
            },
            _ => Err(not_an_array()),
        }
    }
}

fn not_an_array() -> DashboardError {
    serde_json::Error::custom("expected an array of records or {\"data\": [...]}").into()
}

/// Разбирает одну строку фида в её сырую форму.
pub(crate) fn row<T: DeserializeOwned>(value: Value) -> Result<T, DashboardError> {
    Ok(serde_json::from_value(value)?)
}

/// Скаляр в том виде, в котором его прислал сервис: число или строка.
/// Суммы, ИНН и номера заказов приходят и так, и так.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub(crate) struct RawScalar(Value);

impl RawScalar {
    /// Текстовое представление. Число отдаётся в исходной записи,
    /// без прохода через `f64`.
    pub(crate) fn into_text(self) -> String {
        match self.0 {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

/// Строка выписки до валидации.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawBankTransaction {
    pub date: Option<String>,
    pub debit: Option<RawScalar>,
    pub credit: Option<RawScalar>,
    pub inn: Option<RawScalar>,
    pub counterparty: Option<String>,
    pub account: Option<RawScalar>,
    pub purpose: Option<String>,
    pub category: Option<String>,
    pub document_type: Option<String>,
    pub is_collapsed: Option<bool>,
}

/// Строка заказа 1С до валидации.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSalesOrder {
    pub date: Option<String>,
    pub group_name: Option<String>,
    pub order_id: Option<RawScalar>,
    pub debit: Option<RawScalar>,
    pub credit: Option<RawScalar>,
    pub counterparty: Option<String>,
    pub manager: Option<String>,
    pub product: Option<String>,
    pub cost: Option<RawScalar>,
    pub gross_profit: Option<RawScalar>,
    pub payment_method: Option<String>,
}

/// Банковская операция сводного фида до валидации.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawBankOperation {
    pub date: Option<String>,
    pub organization: Option<String>,
    pub operation: Option<String>,
    pub method: Option<String>,
    pub amount: Option<RawScalar>,
    pub counterparty: Option<String>,
    pub purpose: Option<String>,
}

/// Остаток на начало месяца до валидации.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawMonthlyBalance {
    pub organization: Option<String>,
    pub date: Option<String>,
    pub balance: Option<RawScalar>,
}
