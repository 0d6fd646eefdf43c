//! Event Tracker Common Library
//!
//! CSVイベントデータの列マッピング・識別キー・絞り込み・集計。
//! ファイルI/Oは持たない。

pub mod types;
pub mod schema;
pub mod identity;
pub mod filter;
pub mod analytics;
pub mod error;

pub use types::{Dataset, Record};
pub use schema::{resolve_columns, ColumnResolution, Role, SchemaError, SchemaMapping};
pub use identity::{compose_identity_key, identity_key, IDENTITY_COLUMN, LEGACY_IDENTITY_COLUMN};
pub use filter::{distinct_values, filter_records, FilterCriteria, PriceClass, PriceMode, ALL_SENTINEL};
pub use analytics::{price_counts, top_locations, PriceCounts, DEFAULT_TOP_LOCATIONS};
pub use error::{Error, Result};
