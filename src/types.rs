//! Доменные типы: записи фидов и узлы дерева «день → группа → запись».

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Денежное значение, используем `Decimal` для точных расчётов.
pub type Money = Decimal;

/// Общий интерфейс финансовой записи, которую можно разложить по дням.
pub trait LedgerEntry {
    /// Календарная дата записи.
    fn date(&self) -> NaiveDate;
    /// Дата в том виде, в котором её прислал источник.
    fn date_label(&self) -> &str;
    /// Списание, если заполнено.
    fn debit(&self) -> Option<Money>;
    /// Поступление, если заполнено.
    fn credit(&self) -> Option<Money>;

    /// Изменение остатка: кредит минус дебет, пустые поля считаются нулём.
    fn net(&self) -> Money {
        self.credit().unwrap_or_default() - self.debit().unwrap_or_default()
    }

    /// Свёрнутость дня, если её прислал источник.
    fn day_collapsed(&self) -> Option<bool> {
        None
    }
}

/// Запись, у которой есть промежуточная группа (юрлицо, товарная линия).
pub trait Classified {
    /// Имя группы.
    fn group_name(&self) -> &str;
}

/// Строка банковской выписки.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BankTransaction {
    /// Дата операции.
    pub date: NaiveDate,
    /// Исходное написание даты.
    pub date_label: String,
    /// Списание.
    pub debit: Option<Money>,
    /// Поступление.
    pub credit: Option<Money>,
    /// ИНН контрагента.
    pub inn: Option<String>,
    /// Контрагент.
    pub counterparty: Option<String>,
    /// Счёт контрагента.
    pub account: Option<String>,
    /// Назначение платежа.
    pub purpose: Option<String>,
    /// Статья учёта.
    pub category: Option<String>,
    /// Тип документа.
    pub document_type: Option<String>,
    /// Свёрнут ли день по данным источника (`isCollapsed`).
    pub day_collapsed: Option<bool>,
}

impl LedgerEntry for BankTransaction {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn date_label(&self) -> &str {
        &self.date_label
    }

    fn debit(&self) -> Option<Money> {
        self.debit
    }

    fn credit(&self) -> Option<Money> {
        self.credit
    }

    fn day_collapsed(&self) -> Option<bool> {
        self.day_collapsed
    }
}

/// Строка заказа из 1С.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SalesOrder {
    /// Дата заказа.
    pub date: NaiveDate,
    /// Исходное написание даты.
    pub date_label: String,
    /// Группа, в которую попадает заказ.
    pub group_name: String,
    /// Номер заказа.
    pub order_id: String,
    /// Списание.
    pub debit: Option<Money>,
    /// Поступление.
    pub credit: Option<Money>,
    /// Контрагент.
    pub counterparty: String,
    /// Менеджер.
    pub manager: String,
    /// Товар.
    pub product: String,
    /// Себестоимость.
    pub cost: Money,
    /// Валовая прибыль.
    pub gross_profit: Money,
    /// Вид оплаты.
    pub payment_method: Option<String>,
}

impl LedgerEntry for SalesOrder {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn date_label(&self) -> &str {
        &self.date_label
    }

    fn debit(&self) -> Option<Money> {
        self.debit
    }

    fn credit(&self) -> Option<Money> {
        self.credit
    }
}

impl Classified for SalesOrder {
    fn group_name(&self) -> &str {
        &self.group_name
    }
}

/// Направление банковской операции.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Поступление.
    Income,
    /// Списание.
    Expense,
}

/// Операция из сводного банковского фида, используется в ежедневном отчёте.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BankOperation {
    /// Дата операции.
    pub date: NaiveDate,
    /// Исходное написание даты.
    pub date_label: String,
    /// Юрлицо, по счёту которого прошла операция.
    pub organization: String,
    /// Направление.
    pub operation: OperationKind,
    /// Способ: «Счет», «QR» и т.п.
    pub method: String,
    /// Сумма операции.
    pub amount: Money,
    /// Контрагент.
    pub counterparty: Option<String>,
    /// Назначение платежа.
    pub purpose: Option<String>,
}

impl LedgerEntry for BankOperation {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn date_label(&self) -> &str {
        &self.date_label
    }

    fn debit(&self) -> Option<Money> {
        (self.operation == OperationKind::Expense).then_some(self.amount)
    }

    fn credit(&self) -> Option<Money> {
        (self.operation == OperationKind::Income).then_some(self.amount)
    }
}

impl Classified for BankOperation {
    fn group_name(&self) -> &str {
        &self.organization
    }
}

/// Остаток юрлица на начало месяца.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBalance {
    /// Юрлицо.
    pub organization: String,
    /// Дата остатка.
    pub date: NaiveDate,
    /// Сумма остатка.
    pub balance: Money,
}

/// Промежуточный узел дерева: записи одной группы за один день.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode<T> {
    /// Имя группы.
    pub name: String,
    /// Записи в исходном порядке.
    pub records: Vec<T>,
}

/// Содержимое дня: записи напрямую или через группы.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayContent<T> {
    /// Выписка: день → запись.
    Records(Vec<T>),
    /// Заказы: день → группа → запись.
    Groups(Vec<GroupNode<T>>),
}

/// Узел дня.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayNode<T> {
    /// Календарная дата.
    pub date: NaiveDate,
    /// Дата в написании источника, для отображения.
    pub label: String,
    /// Вложенные узлы.
    pub content: DayContent<T>,
}

impl<T> DayNode<T> {
    /// Ключ узла дня для трекера свёрнутости.
    #[inline]
    pub const fn key(&self) -> NodeKey {
        NodeKey::Day(self.date)
    }

    /// Ключ группы этого дня.
    #[inline]
    pub fn group_key(&self, group: &GroupNode<T>) -> NodeKey {
        NodeKey::Group(self.date, group.name.clone())
    }

    /// Все записи дня в порядке вывода.
    pub fn records(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match &self.content {
            DayContent::Records(records) => Box::new(records.iter()),
            DayContent::Groups(groups) => Box::new(groups.iter().flat_map(|g| g.records.iter())),
        }
    }

    /// Группы дня; для негруппированных данных пусто.
    pub fn groups(&self) -> &[GroupNode<T>] {
        match &self.content {
            DayContent::Records(_) => &[],
            DayContent::Groups(groups) => groups,
        }
    }

    /// Количество записей за день.
    pub fn len(&self) -> usize {
        self.records().count()
    }

    /// Нет ни одной записи.
    pub fn is_empty(&self) -> bool {
        self.records().next().is_none()
    }
}

/// Идентичность узла дерева. Дата и группа не смешиваются в одну строку.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    /// Узел дня.
    Day(NaiveDate),
    /// Группа внутри дня.
    Group(NaiveDate, String),
}

/// Организационно-правовая форма юрлица.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// ИП.
    Individual,
    /// ООО.
    Company,
    /// Не удалось определить.
    Other,
}

impl EntityKind {
    /// Краткое обозначение для бейджа.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "ИП",
            Self::Company => "ООО",
            Self::Other => "",
        }
    }
}

/// Колонка ежедневного отчёта: итог и детализация по способам.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnData {
    /// Итог по колонке.
    pub total: Money,
    /// Детализация в порядке первого появления способа.
    pub details: Vec<(String, Money)>,
}

/// Юрлицо в ежедневном отчёте.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    /// Название.
    pub name: String,
    /// Форма.
    pub kind: EntityKind,
    /// Поступление денег.
    pub money_in: ColumnData,
    /// Расход денег.
    pub money_out: ColumnData,
}

/// День ежедневного отчёта.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyDay {
    /// Календарная дата.
    pub date: NaiveDate,
    /// Дата в написании источника.
    pub label: String,
    /// Юрлица в порядке первого появления.
    pub entities: Vec<EntitySummary>,
}

impl DailyDay {
    /// Изменение остатка за день по всем юрлицам.
    pub fn net_change(&self) -> Money {
        self.entities
            .iter()
            .map(|e| e.money_in.total - e.money_out.total)
            .sum::<Decimal>()
    }
}
