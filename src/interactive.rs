//! 対話モード
//!
//! 検索 → 絞り込み → 一覧表示 → ブックマーク選択 を繰り返す。

use crate::error::{Result, TrackerError};
use crate::render;
use crate::session::{Action, EventCard, Session, View};
use dialoguer::{Confirm, Input, MultiSelect, Select};
use event_tracker_common::{FilterCriteria, PriceMode, ALL_SENTINEL};

fn interaction_error(e: dialoguer::Error) -> TrackerError {
    TrackerError::Interaction(e.to_string())
}

/// 選択肢の先頭に "All" を付ける
pub fn with_all_option(values: &[String]) -> Vec<String> {
    std::iter::once(ALL_SENTINEL.to_string())
        .chain(values.iter().cloned())
        .collect()
}

/// 選択インデックスを値に変換。何も選ばなければ "All"
pub fn selection_from_indices(options: &[String], chosen: &[usize]) -> Vec<String> {
    let selected: Vec<String> = chosen
        .iter()
        .filter_map(|&i| options.get(i).cloned())
        .collect();
    if selected.is_empty() {
        vec![ALL_SENTINEL.to_string()]
    } else {
        selected
    }
}

/// まだブックマークしていないカード
pub fn bookmark_candidates(cards: &[EventCard]) -> Vec<&EventCard> {
    cards.iter().filter(|c| !c.bookmarked).collect()
}

/// 検索語から条件を作る。入力はそのまま使う（空白だけの語も検索語）
pub fn search_criteria(input: String) -> FilterCriteria {
    FilterCriteria::new().with_search(input)
}

/// 保存に失敗したキーがあるか
pub fn has_storage_failure(results: &[(String, Result<bool>)]) -> bool {
    results
        .iter()
        .any(|(_, r)| matches!(r, Err(TrackerError::Storage { .. })))
}

fn report(err: &TrackerError) {
    tracing::warn!(error = %err, "action failed");
    eprintln!("⚠ {}", err);
}

/// 対話ループ
///
/// 1操作の失敗ではループを抜けない。入力自体のエラーだけを返す。
pub fn run_browse(session: &mut Session) -> Result<()> {
    println!("🔎 対話モード（Ctrl+C で終了）\n");

    let (categories, types) = match session.handle(Action::FilterOptions) {
        Ok(View::Options { categories, types }) => (categories, types),
        Ok(_) => (Vec::new(), Vec::new()),
        Err(err) => {
            report(&err);
            (Vec::new(), Vec::new())
        }
    };

    loop {
        let criteria = prompt_criteria(&categories, &types)?;
        let cards = match session.handle(Action::Browse(criteria)) {
            Ok(View::Events(cards)) => cards,
            Ok(_) => Vec::new(),
            Err(err) => {
                report(&err);
                Vec::new()
            }
        };
        println!();
        print!("{}", render::render_events(&cards));

        let candidates = bookmark_candidates(&cards);
        if !candidates.is_empty() {
            let labels: Vec<String> = candidates
                .iter()
                .map(|c| format!("{} ({})", c.title, c.date))
                .collect();
            let chosen = MultiSelect::new()
                .with_prompt("ブックマークするイベント（Spaceで選択、Enterで確定）")
                .items(&labels)
                .interact()
                .map_err(interaction_error)?;

            let keys: Vec<String> = chosen
                .iter()
                .filter_map(|&i| candidates.get(i).map(|c| c.identity_key.clone()))
                .collect();
            let results = session.bookmark_keys(keys);
            for (key, result) in &results {
                match result {
                    Ok(true) => println!("✔ ブックマークしました: {}", key),
                    Ok(false) => {}
                    Err(err) => report(err),
                }
            }
            if has_storage_failure(&results) {
                retry_save(session)?;
            }
        }

        let again = Confirm::new()
            .with_prompt("続けて検索しますか？")
            .default(true)
            .interact()
            .map_err(interaction_error)?;
        if !again {
            break;
        }
        println!();
    }

    Ok(())
}

/// 保存の再試行。成功するか、断られるまで繰り返す
fn retry_save(session: &Session) -> Result<()> {
    loop {
        let retry = Confirm::new()
            .with_prompt("保存を再試行しますか？")
            .default(true)
            .interact()
            .map_err(interaction_error)?;
        if !retry {
            println!("ブックマークは保存されていません（次の変更時に再度保存します）");
            return Ok(());
        }
        match session.retry_save() {
            Ok(()) => {
                println!("✔ ブックマークを保存しました");
                return Ok(());
            }
            Err(err) => report(&err),
        }
    }
}

fn prompt_criteria(categories: &[String], types: &[String]) -> Result<FilterCriteria> {
    let search: String = Input::new()
        .with_prompt("イベント名で検索（空欄で全件）")
        .allow_empty(true)
        .interact_text()
        .map_err(interaction_error)?;

    let mut criteria = search_criteria(search);

    if !categories.is_empty() {
        criteria = criteria.with_categories(prompt_multi("カテゴリ", categories)?);
    }
    if !types.is_empty() {
        criteria = criteria.with_types(prompt_multi("種別", types)?);
    }

    let modes: Vec<String> = PriceMode::ALL_MODES.iter().map(|m| m.to_string()).collect();
    let price = Select::new()
        .with_prompt("料金")
        .items(&modes)
        .default(0)
        .interact()
        .map_err(interaction_error)?;
    Ok(criteria.with_price(PriceMode::ALL_MODES.get(price).copied().unwrap_or_default()))
}

fn prompt_multi(label: &str, values: &[String]) -> Result<Vec<String>> {
    let options = with_all_option(values);
    let mut defaults = vec![false; options.len()];
    defaults[0] = true;

    let chosen = MultiSelect::new()
        .with_prompt(label)
        .items(&options)
        .defaults(&defaults)
        .interact()
        .map_err(interaction_error)?;
    Ok(selection_from_indices(&options, &chosen))
}

/// 削除するブックマークを選ぶ
pub fn select_bookmarks_to_remove(session: &Session) -> Result<Vec<String>> {
    let keys: Vec<String> = session.bookmarks().keys().map(str::to_string).collect();
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let chosen = MultiSelect::new()
        .with_prompt("削除するブックマーク")
        .items(&keys)
        .interact()
        .map_err(interaction_error)?;
    Ok(chosen.into_iter().filter_map(|i| keys.get(i).cloned()).collect())
}
