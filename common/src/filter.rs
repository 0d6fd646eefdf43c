//! 絞り込みモジュール
//!
//! 検索文字列・カテゴリ・種別・料金の条件をANDで適用し、
//! 元の並び順を保ったままレコードを抽出する。

use crate::error::Error;
use crate::schema::{Role, SchemaMapping};
use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// 複数選択で「制限なし」を表す値
pub const ALL_SENTINEL: &str = "All";

/// 料金の絞り込みモード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceMode {
    #[default]
    All,
    Free,
    Paid,
}

impl PriceMode {
    pub const ALL_MODES: [PriceMode; 3] = [PriceMode::All, PriceMode::Free, PriceMode::Paid];
}

impl std::str::FromStr for PriceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(PriceMode::All),
            "free" => Ok(PriceMode::Free),
            "paid" => Ok(PriceMode::Paid),
            _ => Err(Error::Parse(format!(
                "Unknown price mode: {}. Use all, free, or paid",
                s
            ))),
        }
    }
}

impl fmt::Display for PriceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceMode::All => write!(f, "All"),
            PriceMode::Free => write!(f, "Free"),
            PriceMode::Paid => write!(f, "Paid"),
        }
    }
}

/// 料金区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriceClass {
    Free,
    Paid,
}

impl PriceClass {
    /// "free"（大文字小文字・前後空白無視）のみ Free、それ以外は欠損も含め Paid
    pub fn classify(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("free") => PriceClass::Free,
            _ => PriceClass::Paid,
        }
    }
}

impl fmt::Display for PriceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceClass::Free => write!(f, "Free"),
            PriceClass::Paid => write!(f, "Paid"),
        }
    }
}

/// 絞り込み条件
///
/// 操作のたびに入力から作り直す。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// イベント名の部分一致検索（空なら無効）
    #[serde(default)]
    pub search: String,
    /// 選択カテゴリ（空または "All" を含めば無制限）
    #[serde(default)]
    pub categories: Vec<String>,
    /// 選択種別（同上）
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub price: PriceMode,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_price(mut self, price: PriceMode) -> Self {
        self.price = price;
        self
    }

    /// どの条件も有効でない
    pub fn is_unrestricted(&self) -> bool {
        self.search.is_empty()
            && selection(&self.categories).is_none()
            && selection(&self.types).is_none()
            && self.price == PriceMode::All
    }
}

/// 有効な選択集合（空・"All" 含みは None）
fn selection(selected: &[String]) -> Option<&[String]> {
    if selected.is_empty() || selected.iter().any(|s| s == ALL_SENTINEL) {
        None
    } else {
        Some(selected)
    }
}

/// 事前計算した条件
struct Predicates<'c> {
    search: Option<String>,
    category: Option<(&'c str, &'c [String])>,
    event_type: Option<(&'c str, &'c [String])>,
    price: Option<(&'c str, PriceClass)>,
}

impl<'c> Predicates<'c> {
    fn new(mapping: &'c SchemaMapping, criteria: &'c FilterCriteria) -> Self {
        let search = (!criteria.search.is_empty()).then(|| criteria.search.to_lowercase());

        let member = |role: Role, selected: &'c [String]| {
            mapping
                .column(role)
                .zip(selection(selected))
        };

        let price = match criteria.price {
            PriceMode::All => None,
            PriceMode::Free => Some(PriceClass::Free),
            PriceMode::Paid => Some(PriceClass::Paid),
        };

        Self {
            search,
            category: member(Role::Category, &criteria.categories),
            event_type: member(Role::Type, &criteria.types),
            price: mapping.price.as_deref().zip(price),
        }
    }

    fn matches(&self, record: &Record, mapping: &SchemaMapping) -> bool {
        if let Some(needle) = &self.search {
            let hit = mapping
                .event_name(record)
                .is_some_and(|name| name.to_lowercase().contains(needle.as_str()));
            if !hit {
                return false;
            }
        }

        for (column, selected) in [self.category, self.event_type].into_iter().flatten() {
            let hit = record
                .get(column)
                .is_some_and(|v| selected.iter().any(|s| s == v));
            if !hit {
                return false;
            }
        }

        if let Some((column, class)) = self.price {
            if PriceClass::classify(record.get(column)) != class {
                return false;
            }
        }

        true
    }
}

/// 条件に合うレコードを元の順序で返す
pub fn filter_records<'a>(
    records: &'a [Record],
    mapping: &SchemaMapping,
    criteria: &FilterCriteria,
) -> Vec<&'a Record> {
    let predicates = Predicates::new(mapping, criteria);
    records
        .iter()
        .filter(|r| predicates.matches(r, mapping))
        .collect()
}

/// 役割の列に現れる値の一覧（重複除去・ソート済み、欠損除く）
///
/// 役割が未解決なら空。
pub fn distinct_values(records: &[Record], mapping: &SchemaMapping, role: Role) -> Vec<String> {
    let Some(column) = mapping.column(role) else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|r| r.get(column))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
