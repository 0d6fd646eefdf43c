//! イベントデータの型定義
//!
//! CLIと対話モードで共有される型:
//! - Record: CSVの1行（列名 → 値）
//! - Dataset: ヘッダーと全レコード

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// イベント1件分のレコード
///
/// 空セルは「値なし」として保持しない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// (列名, 値) の組から生成。空文字の値は欠損扱い
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (column, value) in pairs {
            record.set(column, value);
        }
        record
    }

    /// 列の値を取得
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// 値を設定（空文字なら欠損として削除）
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        if value.is_empty() {
            self.fields.remove(&column);
        } else {
            self.fields.insert(column, value);
        }
    }

    /// 値を持つ列名
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 読み込んだデータセット
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// ヘッダー（前後の空白除去済み、ファイル順）
    pub columns: Vec<String>,
    /// ファイル順のレコード
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
