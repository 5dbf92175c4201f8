//! Состояние свёрнутости узлов дерева.

use std::collections::HashMap;

use crate::config::CollapsePolicy;
use crate::types::NodeKey;
use chrono::NaiveDate;
use tracing::{info, trace};

/// Таблица, из которой пришли данные.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// Банковская выписка.
    Bank,
    /// Заказы 1С.
    Sales,
    /// Ежедневный отчёт.
    Daily,
}

/// Идентичность источника данных: таблица и запрошенный период.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId {
    /// Таблица.
    pub feed: FeedKind,
    /// Период отчёта, если он задан.
    pub period: Option<(NaiveDate, NaiveDate)>,
}

impl SourceId {
    /// Источник без периода.
    #[inline]
    pub const fn new(feed: FeedKind) -> Self {
        Self { feed, period: None }
    }

    /// Источник за период.
    #[inline]
    pub const fn with_period(feed: FeedKind, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            feed,
            period: Some((start, end)),
        }
    }
}

/// Свёрнутость узлов одной таблицы.
///
/// Значение узла определяется так: переключение пользователя, затем
/// значение из данных источника, затем политика таблицы. Переключение
/// одного узла не трогает ни соседей, ни потомков.
#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    policy: CollapsePolicy,
    source: Option<SourceId>,
    seeded: HashMap<NodeKey, bool>,
    toggled: HashMap<NodeKey, bool>,
}

impl CollapseState {
    /// Пустое состояние с политикой таблицы.
    #[inline]
    pub fn new(policy: CollapsePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Привязывает состояние к источнику данных.
    ///
    /// Обновление данных того же источника сохраняет состояние; смена
    /// источника (другая таблица или период) сбрасывает всё. Возвращает
    /// `true`, если состояние было сброшено.
    pub fn attach(&mut self, source: SourceId) -> bool {
        if self.source == Some(source) {
            return false;
        }
        let had_state = !self.toggled.is_empty() || !self.seeded.is_empty();
        self.toggled.clear();
        self.seeded.clear();
        let previous = self.source.replace(source);
        if had_state {
            info!(?previous, ?source, "collapse state reset for new source");
        }
        true
    }

    /// Текущий источник.
    #[inline]
    pub const fn source(&self) -> Option<&SourceId> {
        self.source.as_ref()
    }

    /// Задаёт значение по умолчанию, пришедшее из данных источника.
    pub fn seed(&mut self, key: NodeKey, collapsed: bool) {
        self.seeded.insert(key, collapsed);
    }

    /// Свёрнут ли узел. Неизвестный ключ не ошибка: берётся умолчание.
    pub fn is_collapsed(&self, key: &NodeKey) -> bool {
        self.toggled
            .get(key)
            .or_else(|| self.seeded.get(key))
            .copied()
            .unwrap_or_else(|| self.default_for(key))
    }

    /// Переключает ровно один узел.
    pub fn toggle(&mut self, key: NodeKey) {
        let collapsed = !self.is_collapsed(&key);
        trace!(?key, collapsed, "node toggled");
        self.toggled.insert(key, collapsed);
    }

    /// Сколько узлов пользователь переключал.
    #[inline]
    pub fn toggled_len(&self) -> usize {
        self.toggled.len()
    }

    const fn default_for(&self, key: &NodeKey) -> bool {
        match key {
            NodeKey::Day(_) => self.policy.days_collapsed,
            NodeKey::Group(..) => self.policy.groups_collapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn unknown_key_uses_policy() {
        let state = CollapseState::new(CollapsePolicy {
            days_collapsed: true,
            groups_collapsed: false,
        });
        assert!(state.is_collapsed(&NodeKey::Day(date(1))));
        assert!(!state.is_collapsed(&NodeKey::Group(date(1), "ИП1".into())));
    }

    #[test]
    fn toggle_twice_restores_value() {
        let mut state = CollapseState::default();
        let key = NodeKey::Group(date(1), "Плитка".into());
        state.toggle(key.clone());
        assert!(state.is_collapsed(&key));
        state.toggle(key.clone());
        assert!(!state.is_collapsed(&key));
    }

    #[test]
    fn toggle_does_not_cascade() {
        let mut state = CollapseState::default();
        let day = NodeKey::Day(date(1));
        let group = NodeKey::Group(date(1), "Плитка".into());
        let sibling = NodeKey::Day(date(2));
        state.toggle(day.clone());
        assert!(state.is_collapsed(&day));
        assert!(!state.is_collapsed(&group));
        assert!(!state.is_collapsed(&sibling));
    }

    #[test]
    fn day_and_group_keys_never_collide() {
        let mut state = CollapseState::default();
        // Группа названа так же, как дата: строковые ключи здесь бы совпали.
        let group = NodeKey::Group(date(1), "2025-06-01".into());
        state.toggle(group.clone());
        assert!(state.is_collapsed(&group));
        assert!(!state.is_collapsed(&NodeKey::Day(date(1))));
    }

    #[test]
    fn seeded_default_is_overridden_by_toggle() {
        let mut state = CollapseState::default();
        let day = NodeKey::Day(date(3));
        state.seed(day.clone(), true);
        assert!(state.is_collapsed(&day));
        state.toggle(day.clone());
        assert!(!state.is_collapsed(&day));
    }

    #[test]
    fn same_source_keeps_state_new_source_resets() {
        let mut state = CollapseState::default();
        let june = SourceId::with_period(FeedKind::Bank, date(1), date(30));
        assert!(state.attach(june));
        state.toggle(NodeKey::Day(date(1)));

        assert!(!state.attach(june));
        assert!(state.is_collapsed(&NodeKey::Day(date(1))));

        let first_half = SourceId::with_period(FeedKind::Bank, date(1), date(15));
        assert!(state.attach(first_half));
        assert!(!state.is_collapsed(&NodeKey::Day(date(1))));
        assert_eq!(state.toggled_len(), 0);
        assert_eq!(state.source(), Some(&first_half));
    }
}
