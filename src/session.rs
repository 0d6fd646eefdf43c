//! セッション
//!
//! データセット・列マッピング・ブックマークストアをまとめて保持し、
//! ユーザー操作ごとに同期的に処理して表示用のビューを返す。

use crate::bookmarks::{BookmarkRow, BookmarkStore};
use crate::dataset::load_dataset;
use crate::error::{Result, TrackerError};
use event_tracker_common::{
    distinct_values, filter_records, identity_key, price_counts, top_locations, Dataset,
    FilterCriteria, PriceCounts, Record, Role, SchemaMapping,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// ユーザー操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 条件で絞り込んだイベント一覧
    Browse(FilterCriteria),
    /// 識別キーでブックマーク
    Bookmark(String),
    /// ブックマーク削除
    RemoveBookmarks(Vec<String>),
    ListBookmarks,
    Analytics { top: usize },
    /// カテゴリ・種別の選択肢
    FilterOptions,
}

/// イベントカード（一覧の1件）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventCard {
    pub identity_key: String,
    pub title: String,
    pub date: String,
    pub location: String,
    pub event_type: String,
    pub category: String,
    pub price: String,
    pub link: String,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsView {
    /// 料金列がなければ None
    pub price: Option<PriceCounts>,
    pub top_locations: Vec<(String, usize)>,
}

/// 操作結果のビュー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum View {
    Events(Vec<EventCard>),
    Bookmarked { identity_key: String, newly_added: bool },
    Removed(usize),
    Bookmarks(Vec<BookmarkRow>),
    Analytics(AnalyticsView),
    Options { categories: Vec<String>, types: Vec<String> },
}

#[derive(Debug)]
pub struct Session {
    dataset: Dataset,
    mapping: SchemaMapping,
    bookmarks: BookmarkStore,
}

impl Session {
    /// データセットを読み込み、列を解決し、ブックマークを開く
    pub fn open(data_path: &Path, bookmark_path: &Path) -> Result<Self> {
        let dataset = load_dataset(data_path)?;
        Self::from_dataset(dataset, bookmark_path)
    }

    pub fn from_dataset(dataset: Dataset, bookmark_path: &Path) -> Result<Self> {
        let mapping = SchemaMapping::resolve(&dataset.columns)?;
        tracing::debug!(?mapping, "schema resolved");

        let bookmarks = BookmarkStore::open(bookmark_path, &dataset.columns, &mapping)?;
        Ok(Self {
            dataset,
            mapping,
            bookmarks,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn mapping(&self) -> &SchemaMapping {
        &self.mapping
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    /// 操作を1件処理する
    pub fn handle(&mut self, action: Action) -> Result<View> {
        match action {
            Action::Browse(criteria) => Ok(View::Events(self.browse(&criteria))),
            Action::Bookmark(key) => {
                let newly_added = self.bookmark(&key)?;
                Ok(View::Bookmarked {
                    identity_key: key,
                    newly_added,
                })
            }
            Action::RemoveBookmarks(keys) => {
                let keys: HashSet<String> = keys.into_iter().collect();
                Ok(View::Removed(self.bookmarks.remove(&keys)?))
            }
            Action::ListBookmarks => Ok(View::Bookmarks(self.bookmarks.rows(&self.mapping))),
            Action::Analytics { top } => Ok(View::Analytics(self.analytics(top))),
            Action::FilterOptions => Ok(View::Options {
                categories: distinct_values(&self.dataset.records, &self.mapping, Role::Category),
                types: distinct_values(&self.dataset.records, &self.mapping, Role::Type),
            }),
        }
    }

    /// 絞り込み結果をカードにする
    pub fn browse(&self, criteria: &FilterCriteria) -> Vec<EventCard> {
        filter_records(&self.dataset.records, &self.mapping, criteria)
            .into_iter()
            .map(|r| self.card(r))
            .collect()
    }

    fn card(&self, record: &Record) -> EventCard {
        let value = |role: Role| self.mapping.value(record, role).unwrap_or_default().to_string();
        let key = identity_key(record, &self.mapping);
        EventCard {
            bookmarked: self.bookmarks.exists(&key),
            identity_key: key,
            title: value(Role::EventName),
            date: value(Role::Date),
            location: value(Role::Location),
            event_type: value(Role::Type),
            category: value(Role::Category),
            price: value(Role::Price),
            link: value(Role::Link),
        }
    }

    /// 識別キーが一致する最初のレコード
    pub fn find_event(&self, key: &str) -> Option<&Record> {
        self.dataset
            .records
            .iter()
            .find(|r| identity_key(r, &self.mapping) == key)
    }

    /// ブックマークを追加。新規なら true、既存なら false
    pub fn bookmark(&mut self, key: &str) -> Result<bool> {
        if self.bookmarks.exists(key) {
            return Ok(false);
        }

        let record = self
            .find_event(key)
            .cloned()
            .ok_or_else(|| TrackerError::EventNotFound(key.to_string()))?;
        self.bookmarks.add(&record, &self.mapping)?;
        Ok(true)
    }

    /// 複数キーを順にブックマーク。失敗したキーがあっても残りを続ける
    pub fn bookmark_keys<I>(&mut self, keys: I) -> Vec<(String, Result<bool>)>
    where
        I: IntoIterator<Item = String>,
    {
        keys.into_iter()
            .map(|key| {
                let result = self.bookmark(&key);
                if let Err(err) = &result {
                    tracing::warn!(key = %key, error = %err, "bookmark failed");
                }
                (key, result)
            })
            .collect()
    }

    /// 保存に失敗したブックマークを書き直す
    pub fn retry_save(&self) -> Result<()> {
        self.bookmarks.save()
    }

    pub fn analytics(&self, top: usize) -> AnalyticsView {
        AnalyticsView {
            price: price_counts(&self.dataset.records, &self.mapping),
            top_locations: top_locations(&self.dataset.records, &self.mapping, top),
        }
    }
}
