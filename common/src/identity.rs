//! ブックマーク用の識別キー
//!
//! キーは「イベント名 + "__" + 日付」。名前と日付が同じイベントは
//! 同一ブックマークとして扱う（互換性のため衝突はそのまま）。

use crate::schema::SchemaMapping;
use crate::types::Record;

/// キーの区切り文字
pub const IDENTITY_SEPARATOR: &str = "__";

/// ブックマークファイルのキー列名
pub const IDENTITY_COLUMN: &str = "identity_key";

/// 旧形式のキー列名（読み込みのみ対応）
pub const LEGACY_IDENTITY_COLUMN: &str = "__unique_key__";

/// 名前と日付からキーを組み立てる
pub fn compose_identity_key(event_name: Option<&str>, date: Option<&str>) -> String {
    format!(
        "{}{}{}",
        event_name.unwrap_or(""),
        IDENTITY_SEPARATOR,
        date.unwrap_or("")
    )
}

/// レコードの識別キー
pub fn identity_key(record: &Record, mapping: &SchemaMapping) -> String {
    compose_identity_key(mapping.event_name(record), mapping.date(record))
}
