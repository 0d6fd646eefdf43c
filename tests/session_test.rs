//! セッションの統合テスト
//!
//! サンプルCSV（4イベント）で検索・絞り込み・ブックマーク・集計を通しで検証

use event_tracker::dataset::write_sample_dataset;
use event_tracker::error::TrackerError;
use event_tracker::session::{Action, Session, View};
use event_tracker_common::{FilterCriteria, PriceCounts, PriceMode, Role};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().expect("Failed to create temp dir");
    let data = dir.path().join("events.csv");
    let bookmarks = dir.path().join("bookmarks.csv");
    assert!(write_sample_dataset(&data, false).expect("sample"));
    (dir, data, bookmarks)
}

fn titles(session: &mut Session, criteria: FilterCriteria) -> Vec<String> {
    match session.handle(Action::Browse(criteria)).expect("browse") {
        View::Events(cards) => cards.into_iter().map(|c| c.title).collect(),
        other => panic!("unexpected view: {:?}", other),
    }
}

fn open(data: &Path, bookmarks: &Path) -> Session {
    Session::open(data, bookmarks).expect("open session")
}

/// 条件なしは全件を元の順序で
#[test]
fn test_browse_all() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    assert_eq!(
        titles(&mut session, FilterCriteria::new()),
        vec!["Google Cloud Summit", "AI Hackathon", "Web Dev Meetup", "Frontend Workshop"]
    );
}

/// カテゴリ Web
#[test]
fn test_filter_category_web() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    let criteria = FilterCriteria::new().with_categories(["Web"]);
    assert_eq!(titles(&mut session, criteria), vec!["Web Dev Meetup", "Frontend Workshop"]);
}

/// 料金 Free
#[test]
fn test_filter_price_free() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    let criteria = FilterCriteria::new().with_price(PriceMode::Free);
    assert_eq!(titles(&mut session, criteria), vec!["Google Cloud Summit", "Web Dev Meetup"]);
}

/// 検索は大文字小文字を無視
#[test]
fn test_search_cloud() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    let criteria = FilterCriteria::new().with_search("cloud");
    assert_eq!(titles(&mut session, criteria), vec!["Google Cloud Summit"]);
}

/// ブックマークして一覧に1件
#[test]
fn test_bookmark_and_list() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    let view = session
        .handle(Action::Bookmark("AI Hackathon__2025-09-30".into()))
        .expect("bookmark");
    assert_eq!(
        view,
        View::Bookmarked {
            identity_key: "AI Hackathon__2025-09-30".into(),
            newly_added: true
        }
    );

    match session.handle(Action::ListBookmarks).expect("list") {
        View::Bookmarks(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].identity_key, "AI Hackathon__2025-09-30");
            assert_eq!(rows[0].event, "AI Hackathon");
        }
        other => panic!("unexpected view: {:?}", other),
    }

    // 一覧のカードにも反映
    match session.handle(Action::Browse(FilterCriteria::new())).expect("browse") {
        View::Events(cards) => {
            let bookmarked: Vec<&str> = cards
                .iter()
                .filter(|c| c.bookmarked)
                .map(|c| c.title.as_str())
                .collect();
            assert_eq!(bookmarked, vec!["AI Hackathon"]);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

/// 2回目のブックマークは追加されない
#[test]
fn test_bookmark_twice() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    assert!(session.bookmark("AI Hackathon__2025-09-30").expect("first"));
    assert!(!session.bookmark("AI Hackathon__2025-09-30").expect("second"));
    assert_eq!(session.bookmarks().len(), 1);
}

/// 存在しないイベントはエラー、セッションは継続
#[test]
fn test_bookmark_unknown_event() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    let err = session
        .handle(Action::Bookmark("No Such Event__2025-01-01".into()))
        .unwrap_err();
    assert!(matches!(err, TrackerError::EventNotFound(_)));
    assert!(session.bookmarks().is_empty());
    assert!(session.bookmark("Web Dev Meetup__2025-10-05").expect("bookmark"));
}

/// ブックマークは次のセッションに引き継がれる
#[test]
fn test_bookmarks_survive_reopen() {
    let (_dir, data, bookmarks) = setup();
    {
        let mut session = open(&data, &bookmarks);
        session.bookmark("AI Hackathon__2025-09-30").expect("bookmark");
        session.bookmark("Web Dev Meetup__2025-10-05").expect("bookmark");
    }

    let mut session = open(&data, &bookmarks);
    assert_eq!(session.bookmarks().len(), 2);

    let view = session
        .handle(Action::RemoveBookmarks(vec![
            "AI Hackathon__2025-09-30".into(),
            "Missing__2025-01-01".into(),
        ]))
        .expect("remove");
    assert_eq!(view, View::Removed(1));

    let session = open(&data, &bookmarks);
    let keys: Vec<&str> = session.bookmarks().keys().collect();
    assert_eq!(keys, vec!["Web Dev Meetup__2025-10-05"]);
}

/// 集計
#[test]
fn test_analytics() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    match session.handle(Action::Analytics { top: 10 }).expect("analytics") {
        View::Analytics(view) => {
            assert_eq!(view.price, Some(PriceCounts { free: 2, paid: 2 }));
            assert_eq!(view.top_locations[0], ("Online".to_string(), 2));
            assert_eq!(view.top_locations.len(), 3);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

/// カテゴリ・種別の選択肢
#[test]
fn test_filter_options() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    match session.handle(Action::FilterOptions).expect("options") {
        View::Options { categories, types } => {
            assert_eq!(categories, vec!["AI", "Cloud", "Web"]);
            assert_eq!(types, vec!["Conference", "Hackathon", "Meetup", "Workshop"]);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

/// 別名の列を持つCSVでも動く
#[test]
fn test_synonym_columns() {
    let dir = tempdir().expect("Failed to create temp dir");
    let data = dir.path().join("events.csv");
    std::fs::write(
        &data,
        "Title,Start_Date,Venue,Cost,Topic\nRust Conf,2025-11-01,Online,free,Rust\nGo Meetup,2025-11-02,Pune,50,Go\n",
    )
    .expect("write");

    let mut session = open(&data, &dir.path().join("bookmarks.csv"));
    assert_eq!(session.mapping().column(Role::EventName), Some("Title"));
    assert_eq!(session.mapping().column(Role::Type), None);

    let criteria = FilterCriteria::new().with_price(PriceMode::Paid);
    assert_eq!(titles(&mut session, criteria), vec!["Go Meetup"]);

    // 種別列がなければ種別条件は無視
    let criteria = FilterCriteria::new().with_types(["Meetup"]);
    assert_eq!(titles(&mut session, criteria).len(), 2);
}

/// 複数キーのブックマークは1件の失敗で止まらない
#[test]
fn test_bookmark_keys_continue_after_failure() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    let results = session.bookmark_keys(vec![
        "No Such Event__2025-01-01".to_string(),
        "AI Hackathon__2025-09-30".to_string(),
        "AI Hackathon__2025-09-30".to_string(),
    ]);
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0].1, Err(TrackerError::EventNotFound(_))));
    assert!(matches!(results[1].1, Ok(true)));
    assert!(matches!(results[2].1, Ok(false)));
    assert_eq!(session.bookmarks().len(), 1);
}

/// 保存に失敗しても残りのキーを処理し、原因を取り除けば再保存できる
#[test]
fn test_bookmark_keys_storage_failure_and_retry() {
    let (dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    // 一時ファイルの位置をディレクトリで塞ぐ
    let blocker = dir.path().join("bookmarks.csv.tmp");
    std::fs::create_dir(&blocker).expect("mkdir");

    let results = session.bookmark_keys(vec![
        "AI Hackathon__2025-09-30".to_string(),
        "Web Dev Meetup__2025-10-05".to_string(),
    ]);
    assert!(results
        .iter()
        .all(|(_, r)| matches!(r, Err(TrackerError::Storage { .. }))));
    assert_eq!(session.bookmarks().len(), 2);
    assert!(!bookmarks.exists());

    assert!(matches!(
        session.retry_save(),
        Err(TrackerError::Storage { .. })
    ));

    std::fs::remove_dir(&blocker).expect("rmdir");
    session.retry_save().expect("retry save");

    let reopened = open(&data, &bookmarks);
    let keys: Vec<&str> = reopened.bookmarks().keys().collect();
    assert_eq!(keys, vec!["AI Hackathon__2025-09-30", "Web Dev Meetup__2025-10-05"]);
}

/// 空白だけの検索語は空白を含む名前に一致
#[test]
fn test_search_whitespace_only() {
    let (_dir, data, bookmarks) = setup();
    let mut session = open(&data, &bookmarks);

    let criteria = FilterCriteria::new().with_search(" ");
    assert_eq!(titles(&mut session, criteria).len(), 4);
}
