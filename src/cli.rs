use clap::{Parser, Subcommand};
use event_tracker_common::PriceMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "event-tracker")]
#[command(about = "技術イベントの検索・ブックマークツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// イベントCSV（設定より優先）
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// ブックマークCSV（設定より優先）
    #[arg(long, global = true)]
    pub bookmarks: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// サンプルのイベントCSVを作成
    Init {
        /// 既存ファイルを上書き
        #[arg(long)]
        force: bool,
    },

    /// イベントを検索・絞り込みして表示
    List {
        /// イベント名で検索（大文字小文字無視）
        #[arg(short, long, default_value = "")]
        search: String,

        /// カテゴリ（複数指定可、All で無制限）
        #[arg(short, long)]
        category: Vec<String>,

        /// 種別（複数指定可、All で無制限）
        #[arg(short = 't', long = "type")]
        event_type: Vec<String>,

        /// 料金 (all/free/paid)
        #[arg(short, long, default_value = "all", value_parser = parse_price_mode)]
        price: PriceMode,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// カテゴリ・種別の選択肢を表示
    Options,

    /// イベントをブックマーク（キー: イベント名__日付）
    Bookmark {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// ブックマークを表示/削除
    Bookmarks {
        /// 削除するキー（複数指定可）
        #[arg(short, long)]
        remove: Vec<String>,

        /// 削除対象を対話的に選択
        #[arg(long)]
        select: bool,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// Free/Paid と開催場所の集計
    Analytics {
        /// 表示する場所の件数（省略時は設定値）
        #[arg(long)]
        top: Option<usize>,
    },

    /// 対話的に検索・ブックマーク
    Browse,

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// イベントCSVのパスを設定
        #[arg(long)]
        set_data: Option<PathBuf>,

        /// ブックマークCSVのパスを設定
        #[arg(long)]
        set_bookmarks: Option<PathBuf>,

        /// 場所グラフの件数を設定
        #[arg(long)]
        set_top: Option<usize>,
    },
}

fn parse_price_mode(s: &str) -> Result<PriceMode, String> {
    s.parse::<PriceMode>().map_err(|e| e.to_string())
}
