//! イベントCSVの読み込みとサンプル生成
//!
//! - ヘッダー行必須、列名は前後の空白を除去
//! - 値はすべて文字列として扱う（日付・数値の変換なし）
//! - 空セルは欠損

use crate::error::{Result, TrackerError};
use event_tracker_common::{Dataset, Record};
use std::io::Read;
use std::path::Path;

/// サンプルの列
pub const SAMPLE_COLUMNS: [&str; 7] = [
    "event_name", "date", "location", "type", "category", "price", "link",
];

/// サンプルイベント
pub const SAMPLE_EVENTS: [[&str; 7]; 4] = [
    ["Google Cloud Summit", "2025-09-20", "Online", "Conference", "Cloud", "Free", "https://cloud.google.com"],
    ["AI Hackathon", "2025-09-30", "Bangalore", "Hackathon", "AI", "Paid", "https://devpost.com"],
    ["Web Dev Meetup", "2025-10-05", "Delhi", "Meetup", "Web", "Free", "https://meetup.com"],
    ["Frontend Workshop", "2025-10-10", "Online", "Workshop", "Web", "Paid", "https://example.com"],
];

/// CSVファイルを読み込む
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(TrackerError::dataset_read(
            path,
            "ファイルがありません。`event-tracker init` でサンプルを作成できます",
        ));
    }

    let file = std::fs::File::open(path).map_err(|e| TrackerError::dataset_read(path, e))?;
    let dataset = read_dataset(file).map_err(|reason| TrackerError::dataset_read(path, reason))?;

    tracing::debug!(
        path = %path.display(),
        columns = dataset.columns.len(),
        records = dataset.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// CSVを読み込む（エラーは理由の文字列）
pub fn read_dataset<R: Read>(source: R) -> std::result::Result<Dataset, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let columns = read_header(&mut reader).map_err(|e| e.to_string())?;
    if columns.is_empty() {
        return Err("ヘッダー行がありません".to_string());
    }

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result.map_err(|e| e.to_string())?;
        if row.len() > columns.len() {
            // ヘッダーが1行目なのでデータは2行目から
            return Err(format!(
                "{}行目: 列数 {} がヘッダーの列数 {} を超えています",
                i + 2,
                row.len(),
                columns.len()
            ));
        }
        // 足りない列は欠損
        records.push(Record::from_pairs(columns.iter().cloned().zip(row.iter())));
    }

    Ok(Dataset::new(columns, records))
}

/// ヘッダーを読み、列名を正規化
pub(crate) fn read_header<R: Read>(reader: &mut csv::Reader<R>) -> csv::Result<Vec<String>> {
    Ok(reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect())
}

/// サンプルCSVを作成。既存ファイルは `force` なしでは上書きしない
///
/// 作成したら true。
pub fn write_sample_dataset(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| TrackerError::dataset_write(parent, e))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| TrackerError::dataset_write(path, e))?;
    writer
        .write_record(SAMPLE_COLUMNS)
        .map_err(|e| TrackerError::dataset_write(path, e))?;
    for row in SAMPLE_EVENTS {
        writer
            .write_record(row)
            .map_err(|e| TrackerError::dataset_write(path, e))?;
    }
    writer.flush().map_err(|e| TrackerError::dataset_write(path, e))?;

    tracing::debug!(path = %path.display(), "sample dataset written");
    Ok(true)
}
