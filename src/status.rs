//! Статус загрузки фидов и ответ на запрос синхронизации.

use crate::error::DashboardError;
use serde::Deserialize;

/// Флаг для отрисовки: идёт ли загрузка и чем она закончилась.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedStatus {
    /// Фид не запрашивался.
    #[default]
    Idle,
    /// Запрос в процессе.
    Loading,
    /// Данные получены.
    Ready {
        /// Сколько записей принято.
        records: usize,
    },
    /// Ошибка; повторный запрос не делается.
    Failed(String),
}

impl FeedStatus {
    /// Статус по результату загрузки.
    pub fn from_result<T>(
        result: &Result<T, DashboardError>,
        records: impl FnOnce(&T) -> usize,
    ) -> Self {
        match result {
            Ok(value) => Self::Ready {
                records: records(value),
            },
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    /// Показывать ли индикатор загрузки.
    #[inline]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Закончилась ли загрузка ошибкой.
    #[inline]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Итог синхронизации на стороне сервиса.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Синхронизация прошла.
    Success,
    /// Сервис сообщил об ошибке.
    Error,
}

/// Тело ответа на `POST /sync`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncResponse {
    /// Итог.
    pub status: SyncState,
    /// Сколько сырых записей получено из источника.
    pub raw_count: Option<u64>,
    /// Сколько прошло валидацию.
    pub validated_count: Option<u64>,
    /// Сколько сохранено.
    pub saved_count: Option<u64>,
    /// Затронутые юрлица.
    pub organizations: Option<Vec<String>>,
    /// Текст ошибки.
    pub error: Option<String>,
}

impl SyncResponse {
    /// Разбирает тело ответа; пустое тело даёт `None`.
    pub fn parse(body: &str) -> Result<Option<Self>, DashboardError> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(body)?))
    }

    /// Статус для индикатора.
    pub fn status(&self) -> FeedStatus {
        match self.status {
            SyncState::Success => FeedStatus::Ready {
                records: self
                    .saved_count
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or_default(),
            },
            SyncState::Error => FeedStatus::Failed(
                self.error
                    .clone()
                    .unwrap_or_else(|| "synchronization failed".to_string()),
            ),
        }
    }
}

/// Статус по сырому ответу синхронизации. Разбор не падает:
/// любая проблема становится `Failed`.
pub fn sync_status(body: &str) -> FeedStatus {
    match SyncResponse::parse(body) {
        Ok(Some(response)) => response.status(),
        Ok(None) => FeedStatus::Ready { records: 0 },
        Err(err) => FeedStatus::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_reports_saved_count() {
        let status = sync_status(
            r#"{"status": "success", "raw_count": 12, "validated_count": 10, "saved_count": 9, "organizations": ["ИП1", "ООО"]}"#,
        );
        assert_eq!(status, FeedStatus::Ready { records: 9 });
    }

    #[test]
    fn error_carries_message() {
        let status = sync_status(r#"{"status": "error", "error": "token expired"}"#);
        assert_eq!(status, FeedStatus::Failed("token expired".to_string()));
        assert!(status.is_failed());
    }

    #[test]
    fn empty_body_is_success() {
        assert_eq!(sync_status("  "), FeedStatus::Ready { records: 0 });
    }

    #[test]
    fn garbage_body_is_failure() {
        assert!(sync_status("<html>502</html>").is_failed());
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(FeedStatus::default(), FeedStatus::Idle);
        assert!(!FeedStatus::Idle.is_loading());
        assert!(FeedStatus::Loading.is_loading());
    }
}
