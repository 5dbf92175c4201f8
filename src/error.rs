//! Ошибки загрузки фидов, конфигурации и агрегации.

/// Ошибка разбора входных данных дашборда.
#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    /// Ошибка ввода-вывода при чтении фида или конфигурации.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Некорректный JSON в ответе сервиса.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Некорректный файл конфигурации.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    /// Ошибка разбора даты.
    #[error("Invalid date '{value}'")]
    InvalidDate {
        /// Некорректная дата.
        value: String,
    },
    /// Один и тот же день записан в фиде в разных форматах.
    #[error("Date {date} written both as '{first}' and '{second}'")]
    DivergentDateFormat {
        /// Календарная дата.
        date: chrono::NaiveDate,
        /// Первое встреченное написание.
        first: String,
        /// Расходящееся написание.
        second: String,
    },
    /// Ошибка разбора денежного значения.
    #[error("Invalid amount '{value}' in field '{field}'")]
    InvalidAmount {
        /// Исходное значение.
        value: String,
        /// Имя поля.
        field: &'static str,
    },
    /// Дебет или кредит не может быть отрицательным.
    #[error("Negative amount '{value}' in field '{field}'")]
    NegativeAmount {
        /// Исходное значение.
        value: String,
        /// Имя поля.
        field: &'static str,
    },
    /// В записи отсутствует обязательное поле.
    #[error("Required field '{field}' missing")]
    MissingField {
        /// Имя пропавшего поля.
        field: &'static str,
    },
    /// Неизвестный тип банковской операции.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
}
