//! Валидация сырых фидов и перевод их в доменные записи.

use std::collections::HashMap;

use crate::config::InvalidRecordPolicy;
use crate::error::DashboardError;
use crate::raw::{
    RawBankOperation, RawBankTransaction, RawFeed, RawMonthlyBalance, RawSalesOrder, RawScalar,
    row,
};
use crate::types::{
    BankOperation, BankTransaction, LedgerEntry, Money, MonthlyBalance, OperationKind, SalesOrder,
};
use crate::utils::{DateFormat, non_negative, normalize_text, parse_amount, parse_date};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Записи фида, прошедшие валидацию.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested<T> {
    /// Валидные записи в исходном порядке.
    pub records: Vec<T>,
    /// Сколько записей отброшено политикой `skip`.
    pub skipped: usize,
}

impl RawFeed {
    /// Разбирает банковскую выписку.
    pub fn bank_transactions(
        &self,
        policy: InvalidRecordPolicy,
    ) -> Result<Ingested<BankTransaction>, DashboardError> {
        ingest("bank", self.rows()?, policy, bank_transaction)
    }

    /// Разбирает заказы 1С.
    pub fn sales_orders(
        &self,
        policy: InvalidRecordPolicy,
    ) -> Result<Ingested<SalesOrder>, DashboardError> {
        ingest("sales", self.rows()?, policy, sales_order)
    }

    /// Разбирает операции сводного банковского фида.
    pub fn bank_operations(
        &self,
        policy: InvalidRecordPolicy,
    ) -> Result<Ingested<BankOperation>, DashboardError> {
        ingest("operations", self.rows()?, policy, bank_operation)
    }

    /// Разбирает остатки на начало месяца.
    pub fn monthly_balances(
        &self,
        policy: InvalidRecordPolicy,
    ) -> Result<Ingested<MonthlyBalance>, DashboardError> {
        let rows = self.rows()?;
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0;
        for (index, value) in rows.into_iter().enumerate() {
            let parsed = row::<RawMonthlyBalance>(value).and_then(monthly_balance);
            if let Some(record) = admit("balances", index, parsed, policy)? {
                records.push(record);
            } else {
                skipped += 1;
            }
        }
        Ok(Ingested { records, skipped })
    }
}

/// Общий проход по строкам фида с учётом политики и проверкой форматов дат.
fn ingest<R, T, F>(
    feed: &'static str,
    rows: Vec<Value>,
    policy: InvalidRecordPolicy,
    mut convert: F,
) -> Result<Ingested<T>, DashboardError>
where
    R: DeserializeOwned,
    T: LedgerEntry,
    F: FnMut(R) -> Result<(T, DateFormat), DashboardError>,
{
    let mut formats = DateFormats::default();
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for (index, value) in rows.into_iter().enumerate() {
        // Несовпадение типов поля проходит через ту же политику, что и валидация.
        let parsed = row::<R>(value).and_then(&mut convert);
        match admit(feed, index, parsed, policy)? {
            Some((record, format)) => {
                // Разнобой форматов ломает весь фид, политика skip здесь не действует.
                formats.check(record.date(), format, record.date_label())?;
                records.push(record);
            }
            None => skipped += 1,
        }
    }

    debug!(feed, accepted = records.len(), skipped, "feed ingested");
    Ok(Ingested { records, skipped })
}

/// Применяет политику к результату разбора одной строки.
fn admit<T>(
    feed: &'static str,
    index: usize,
    result: Result<T, DashboardError>,
    policy: InvalidRecordPolicy,
) -> Result<Option<T>, DashboardError> {
    match (result, policy) {
        (Ok(record), _) => Ok(Some(record)),
        (Err(err), InvalidRecordPolicy::Skip) => {
            warn!(feed, index, error = %err, "invalid record skipped");
            Ok(None)
        }
        (Err(err), InvalidRecordPolicy::Reject) => Err(err),
    }
}

/// Первое встреченное написание каждого календарного дня.
#[derive(Default)]
struct DateFormats {
    seen: HashMap<NaiveDate, (DateFormat, String)>,
}

impl DateFormats {
    fn check(
        &mut self,
        date: NaiveDate,
        format: DateFormat,
        label: &str,
    ) -> Result<(), DashboardError> {
        match self.seen.get(&date) {
            Some((first_format, first)) if *first_format != format => {
                Err(DashboardError::DivergentDateFormat {
                    date,
                    first: first.clone(),
                    second: label.to_string(),
                })
            }
            Some(_) => Ok(()),
            None => {
                self.seen.insert(date, (format, label.to_string()));
                Ok(())
            }
        }
    }
}

fn required_date(value: Option<String>) -> Result<(NaiveDate, DateFormat, String), DashboardError> {
    let label = normalize_text(value).ok_or(DashboardError::MissingField { field: "date" })?;
    let (date, format) = parse_date(&label)?;
    Ok((date, format, label))
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, DashboardError> {
    normalize_text(value).ok_or(DashboardError::MissingField { field })
}

fn optional_scalar(value: Option<RawScalar>) -> Option<String> {
    normalize_text(value.map(RawScalar::into_text))
}

fn amount(value: Option<RawScalar>, field: &'static str) -> Result<Option<Money>, DashboardError> {
    match value {
        Some(raw) => parse_amount(&raw.into_text(), field),
        None => Ok(None),
    }
}

fn debit_credit(
    debit: Option<RawScalar>,
    credit: Option<RawScalar>,
) -> Result<(Option<Money>, Option<Money>), DashboardError> {
    Ok((
        non_negative(amount(debit, "debit")?, "debit")?,
        non_negative(amount(credit, "credit")?, "credit")?,
    ))
}

fn bank_transaction(raw: RawBankTransaction) -> Result<(BankTransaction, DateFormat), DashboardError> {
    let (date, format, date_label) = required_date(raw.date)?;
    let (debit, credit) = debit_credit(raw.debit, raw.credit)?;
    Ok((
        BankTransaction {
            date,
            date_label,
            debit,
            credit,
            inn: optional_scalar(raw.inn),
            counterparty: normalize_text(raw.counterparty),
            account: optional_scalar(raw.account),
            purpose: normalize_text(raw.purpose),
            category: normalize_text(raw.category),
            document_type: normalize_text(raw.document_type),
            day_collapsed: raw.is_collapsed,
        },
        format,
    ))
}

fn sales_order(raw: RawSalesOrder) -> Result<(SalesOrder, DateFormat), DashboardError> {
    let (date, format, date_label) = required_date(raw.date)?;
    let group_name = required_text(raw.group_name, "groupName")?;
    let order_id = optional_scalar(raw.order_id).ok_or(DashboardError::MissingField {
        field: "orderId",
    })?;
    let (debit, credit) = debit_credit(raw.debit, raw.credit)?;
    Ok((
        SalesOrder {
            date,
            date_label,
            group_name,
            order_id,
            debit,
            credit,
            counterparty: normalize_text(raw.counterparty).unwrap_or_default(),
            manager: normalize_text(raw.manager).unwrap_or_default(),
            product: normalize_text(raw.product).unwrap_or_default(),
            cost: amount(raw.cost, "cost")?.unwrap_or_default(),
            gross_profit: amount(raw.gross_profit, "grossProfit")?.unwrap_or_default(),
            payment_method: normalize_text(raw.payment_method),
        },
        format,
    ))
}

fn operation_kind(value: &str) -> Result<OperationKind, DashboardError> {
    match value.to_lowercase().as_str() {
        "поступление" | "income" => Ok(OperationKind::Income),
        "списание" | "expense" => Ok(OperationKind::Expense),
        _ => Err(DashboardError::UnknownOperation(value.to_string())),
    }
}

fn bank_operation(raw: RawBankOperation) -> Result<(BankOperation, DateFormat), DashboardError> {
    let (date, format, date_label) = required_date(raw.date)?;
    let organization = required_text(raw.organization, "organization")?;
    let operation = operation_kind(&required_text(raw.operation, "operation")?)?;
    let method = required_text(raw.method, "method")?;
    let amount = non_negative(amount(raw.amount, "amount")?, "amount")?
        .ok_or(DashboardError::MissingField { field: "amount" })?;
    Ok((
        BankOperation {
            date,
            date_label,
            organization,
            operation,
            method,
            amount,
            counterparty: normalize_text(raw.counterparty),
            purpose: normalize_text(raw.purpose),
        },
        format,
    ))
}

fn monthly_balance(raw: RawMonthlyBalance) -> Result<MonthlyBalance, DashboardError> {
    let organization = required_text(raw.organization, "organization")?;
    let (date, _, _) = required_date(raw.date)?;
    let balance =
        amount(raw.balance, "balance")?.ok_or(DashboardError::MissingField { field: "balance" })?;
    Ok(MonthlyBalance {
        organization,
        date,
        balance,
    })
}
