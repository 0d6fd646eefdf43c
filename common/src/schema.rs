//! 列マッピングモジュール
//!
//! CSVのヘッダー名の表記ゆれ（"title" / "name" など）を吸収し、
//! 固定の役割（イベント名・日付・場所など）に実際の列名を割り当てる。

use crate::types::Record;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// 列の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    EventName,
    Date,
    Location,
    Type,
    Category,
    Price,
    Link,
}

impl Role {
    /// 全役割（表示・エラー報告の順序）
    pub const ALL: [Role; 7] = [
        Role::EventName,
        Role::Date,
        Role::Location,
        Role::Type,
        Role::Category,
        Role::Price,
        Role::Link,
    ];

    /// 必須の役割
    pub const REQUIRED: [Role; 3] = [Role::EventName, Role::Date, Role::Location];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::EventName => "event_name",
            Role::Date => "date",
            Role::Location => "location",
            Role::Type => "type",
            Role::Category => "category",
            Role::Price => "price",
            Role::Link => "link",
        }
    }

    /// 受け付ける列名（優先順）
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Role::EventName => &["event_name", "title", "name"],
            Role::Date => &["date", "event_date", "start_date"],
            Role::Location => &["location", "city", "venue"],
            Role::Type => &["type", "event_type", "mode"],
            Role::Category => &["category", "tags", "topic"],
            Role::Price => &["price", "cost", "fee"],
            Role::Link => &["link", "url"],
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 必須列が見つからない
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "CSV is missing required columns: {} (detected columns: {})",
    join_roles(.missing),
    .found.join(", ")
)]
pub struct SchemaError {
    /// 見つからなかった必須役割
    pub missing: Vec<Role>,
    /// CSVに存在した列名
    pub found: Vec<String>,
}

fn join_roles(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
}

/// 候補のうち最初に存在する列名を返す（大文字小文字無視）
///
/// 同じ小文字表記の列が複数あれば、後ろの列が優先される。
pub fn find_first_column(columns: &[String], candidates: &[&str]) -> Option<String> {
    let lowered: HashMap<String, &String> = columns
        .iter()
        .map(|c| (c.to_lowercase(), c))
        .collect();

    candidates
        .iter()
        .find_map(|cand| lowered.get(&cand.to_lowercase()))
        .map(|c| (*c).clone())
}

/// 役割ごとの解決結果（未解決を含む）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnResolution {
    columns: HashMap<Role, String>,
    found: Vec<String>,
}

impl ColumnResolution {
    pub fn get(&self, role: Role) -> Option<&str> {
        self.columns.get(&role).map(String::as_str)
    }

    /// 解決できなかった必須役割
    pub fn missing_required(&self) -> Vec<Role> {
        Role::REQUIRED
            .iter()
            .copied()
            .filter(|r| !self.columns.contains_key(r))
            .collect()
    }
}

/// 全役割を同義語表で解決する
pub fn resolve_columns(columns: &[String]) -> ColumnResolution {
    let resolved = Role::ALL
        .iter()
        .filter_map(|role| find_first_column(columns, role.synonyms()).map(|c| (*role, c)))
        .collect();

    ColumnResolution {
        columns: resolved,
        found: columns.to_vec(),
    }
}

/// 解決済みの列マッピング
///
/// 必須役割は必ず存在する。構築後は読み取り専用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaMapping {
    pub event_name: String,
    pub date: String,
    pub location: String,
    pub event_type: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub link: Option<String>,
}

impl SchemaMapping {
    /// ヘッダーから解決。必須役割が欠けていればエラー
    pub fn resolve(columns: &[String]) -> Result<Self, SchemaError> {
        Self::try_from(resolve_columns(columns))
    }

    /// 役割に対応する列名
    pub fn column(&self, role: Role) -> Option<&str> {
        match role {
            Role::EventName => Some(&self.event_name),
            Role::Date => Some(&self.date),
            Role::Location => Some(&self.location),
            Role::Type => self.event_type.as_deref(),
            Role::Category => self.category.as_deref(),
            Role::Price => self.price.as_deref(),
            Role::Link => self.link.as_deref(),
        }
    }

    /// レコードから役割の値を取得（未解決・欠損は None）
    pub fn value<'a>(&self, record: &'a Record, role: Role) -> Option<&'a str> {
        self.column(role).and_then(|c| record.get(c))
    }

    pub fn event_name<'a>(&self, record: &'a Record) -> Option<&'a str> {
        record.get(&self.event_name)
    }

    pub fn date<'a>(&self, record: &'a Record) -> Option<&'a str> {
        record.get(&self.date)
    }

    pub fn location<'a>(&self, record: &'a Record) -> Option<&'a str> {
        record.get(&self.location)
    }
}

impl TryFrom<ColumnResolution> for SchemaMapping {
    type Error = SchemaError;

    fn try_from(resolution: ColumnResolution) -> Result<Self, Self::Error> {
        let missing = resolution.missing_required();
        let ColumnResolution { mut columns, found } = resolution;
        if !missing.is_empty() {
            return Err(SchemaError { missing, found });
        }

        let mut take = |role: Role| columns.remove(&role);
        // 必須役割は missing_required で確認済み
        let (Some(event_name), Some(date), Some(location)) =
            (take(Role::EventName), take(Role::Date), take(Role::Location))
        else {
            return Err(SchemaError {
                missing: Role::REQUIRED.to_vec(),
                found,
            });
        };

        Ok(Self {
            event_name,
            date,
            location,
            event_type: take(Role::Type),
            category: take(Role::Category),
            price: take(Role::Price),
            link: take(Role::Link),
        })
    }
}
