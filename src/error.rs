use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Common(#[from] event_tracker_common::Error),

    #[error("データセットを読み込めません ({path}): {reason}")]
    DatasetRead { path: String, reason: String },

    #[error("データセットを書き込めません ({path}): {reason}")]
    DatasetWrite { path: String, reason: String },

    #[error("ブックマークファイルのエラー ({path}): {reason}")]
    Storage { path: String, reason: String },

    #[error("イベントが見つかりません: {0}")]
    EventNotFound(String),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("入力エラー: {0}")]
    Interaction(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<event_tracker_common::SchemaError> for TrackerError {
    fn from(err: event_tracker_common::SchemaError) -> Self {
        TrackerError::Common(err.into())
    }
}

impl TrackerError {
    pub fn dataset_read(path: &std::path::Path, reason: impl ToString) -> Self {
        TrackerError::DatasetRead {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn dataset_write(path: &std::path::Path, reason: impl ToString) -> Self {
        TrackerError::DatasetWrite {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn storage(path: &std::path::Path, reason: impl ToString) -> Self {
        TrackerError::Storage {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// 列マッピングの失敗なら詳細を返す
    pub fn as_schema_error(&self) -> Option<&event_tracker_common::SchemaError> {
        match self {
            TrackerError::Common(event_tracker_common::Error::Schema(err)) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
