//! ブックマークストア
//!
//! 識別キー（イベント名__日付）で一意なブックマークをCSVに保存する。
//! 追加・削除のたびに全件を書き直す。書き込みは一時ファイル経由の
//! rename で行い、途中で失敗しても既存ファイルは壊れない。

use crate::dataset::read_header;
use crate::error::{Result, TrackerError};
use event_tracker_common::{
    identity_key, Record, SchemaMapping, IDENTITY_COLUMN, LEGACY_IDENTITY_COLUMN,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

/// ブックマーク1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkEntry {
    pub identity_key: String,
    pub record: Record,
}

/// 一覧表示用の行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkRow {
    pub identity_key: String,
    pub event: String,
    pub date: String,
    pub location: String,
    /// 料金列がマッピングされていなければ None
    pub price: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookmarkStore {
    path: PathBuf,
    /// キー列を除いた列（書き込み順）
    columns: Vec<String>,
    entries: Vec<BookmarkEntry>,
}

impl BookmarkStore {
    /// ブックマークファイルを開く
    ///
    /// ファイルがなければ空のストア（データセットの列 + identity_key）。
    /// ファイルは最初の変更まで作成しない。
    pub fn open(path: &Path, dataset_columns: &[String], mapping: &SchemaMapping) -> Result<Self> {
        let mut store = if path.exists() {
            Self::load(path, mapping)?
        } else {
            Self {
                path: path.to_path_buf(),
                columns: Vec::new(),
                entries: Vec::new(),
            }
        };

        for column in dataset_columns {
            if !store.columns.contains(column) && !is_key_column(column) {
                store.columns.push(column.clone());
            }
        }

        tracing::debug!(
            path = %path.display(),
            entries = store.entries.len(),
            "bookmark store opened"
        );
        Ok(store)
    }

    fn load(path: &Path, mapping: &SchemaMapping) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| TrackerError::storage(path, e))?;

        let headers = read_header(&mut reader).map_err(|e| TrackerError::storage(path, e))?;
        let key_index = headers
            .iter()
            .position(|h| h == IDENTITY_COLUMN)
            .or_else(|| headers.iter().position(|h| h == LEGACY_IDENTITY_COLUMN));
        if key_index.is_none() && !headers.is_empty() {
            tracing::warn!(
                path = %path.display(),
                "bookmark file has no {} column, recomputing keys",
                IDENTITY_COLUMN
            );
        }

        let columns: Vec<String> = headers
            .iter()
            .filter(|h| !is_key_column(h))
            .cloned()
            .collect();

        let mut entries: Vec<BookmarkEntry> = Vec::new();
        let mut seen = HashSet::new();
        for (i, result) in reader.records().enumerate() {
            let row = result.map_err(|e| TrackerError::storage(path, e))?;
            if row.len() > headers.len() {
                return Err(TrackerError::storage(
                    path,
                    format!(
                        "{}行目: 列数 {} がヘッダーの列数 {} を超えています",
                        i + 2,
                        row.len(),
                        headers.len()
                    ),
                ));
            }

            let record = Record::from_pairs(
                headers
                    .iter()
                    .zip(row.iter())
                    .filter(|(h, _)| !is_key_column(h))
                    .map(|(h, v)| (h.clone(), v)),
            );
            let key = key_index
                .and_then(|i| row.get(i))
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| identity_key(&record, mapping));

            if !seen.insert(key.clone()) {
                tracing::warn!(key = %key, "duplicate bookmark dropped");
                continue;
            }
            entries.push(BookmarkEntry {
                identity_key: key,
                record,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            columns,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn entries(&self) -> &[BookmarkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identity_key.as_str())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&BookmarkEntry> {
        self.position(key).map(|i| &self.entries[i])
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.identity_key == key)
    }

    /// ブックマークを追加して保存
    ///
    /// 同じキーが既にあれば何もせず既存のエントリを返す。
    /// 保存に失敗してもメモリ上の追加は取り消さない。
    pub fn add(&mut self, record: &Record, mapping: &SchemaMapping) -> Result<&BookmarkEntry> {
        let key = identity_key(record, mapping);
        if let Some(i) = self.position(&key) {
            tracing::debug!(key = %key, "already bookmarked");
            return Ok(&self.entries[i]);
        }

        let mut extra: Vec<String> = record
            .columns()
            .filter(|c| !self.columns.iter().any(|known| known.as_str() == *c) && !is_key_column(c))
            .map(str::to_string)
            .collect();
        extra.sort();
        self.columns.extend(extra);

        self.entries.push(BookmarkEntry {
            identity_key: key,
            record: record.clone(),
        });
        self.save()?;

        let index = self.entries.len() - 1;
        tracing::debug!(key = %self.entries[index].identity_key, "bookmark added");
        Ok(&self.entries[index])
    }

    /// 指定キーのブックマークを削除して保存。削除件数を返す
    ///
    /// 存在しないキーは無視。1件も消えなければファイルは書き換えない。
    pub fn remove(&mut self, keys: &HashSet<String>) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|e| !keys.contains(&e.identity_key));
        let removed = before - self.entries.len();

        if removed > 0 {
            self.save()?;
            tracing::debug!(removed, "bookmarks removed");
        }
        Ok(removed)
    }

    /// 全件をファイルに書き出す（一時ファイル → rename）
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TrackerError::storage(&self.path, e))?;
        }

        let temp_path = temp_path_for(&self.path);
        let result = self
            .write_to(&temp_path)
            .and_then(|_| std::fs::rename(&temp_path, &self.path).map_err(|e| e.to_string()));

        if let Err(reason) = result {
            if temp_path.is_file() {
                std::fs::remove_file(&temp_path).ok();
            }
            return Err(TrackerError::storage(&self.path, reason));
        }

        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "bookmarks saved");
        Ok(())
    }

    fn write_to(&self, path: &Path) -> std::result::Result<(), String> {
        let file = File::create(path).map_err(|e| e.to_string())?;
        let mut writer = csv::Writer::from_writer(file);

        writer
            .write_record(self.columns.iter().map(String::as_str).chain([IDENTITY_COLUMN]))
            .map_err(|e| e.to_string())?;

        for entry in &self.entries {
            let values = self
                .columns
                .iter()
                .map(|c| entry.record.get(c).unwrap_or(""))
                .chain([entry.identity_key.as_str()]);
            writer.write_record(values).map_err(|e| e.to_string())?;
        }

        let file = writer.into_inner().map_err(|e| e.to_string())?;
        file.sync_all().map_err(|e| e.to_string())
    }

    /// 一覧表示用の行
    pub fn rows(&self, mapping: &SchemaMapping) -> Vec<BookmarkRow> {
        self.entries
            .iter()
            .map(|e| BookmarkRow {
                identity_key: e.identity_key.clone(),
                event: mapping.event_name(&e.record).unwrap_or_default().to_string(),
                date: mapping.date(&e.record).unwrap_or_default().to_string(),
                location: mapping.location(&e.record).unwrap_or_default().to_string(),
                price: mapping
                    .price
                    .as_deref()
                    .map(|c| e.record.get(c).unwrap_or_default().to_string()),
            })
            .collect()
    }
}

fn is_key_column(column: &str) -> bool {
    column == IDENTITY_COLUMN || column == LEGACY_IDENTITY_COLUMN
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "bookmarks.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}
