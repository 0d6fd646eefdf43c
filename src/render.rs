//! ターミナル表示
//!
//! ビューを文字列に整形する。グラフは文字の横棒で表す。

use crate::bookmarks::BookmarkRow;
use crate::session::{AnalyticsView, EventCard};
use std::fmt::Write;

/// 横棒の最大幅（文字数）
const BAR_WIDTH: usize = 30;

/// `max` を満幅とした横棒
pub fn bar(count: usize, max: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH).div_ceil(max);
    "█".repeat(len.min(BAR_WIDTH))
}

/// イベント一覧
pub fn render_events(cards: &[EventCard]) -> String {
    if cards.is_empty() {
        return "条件に一致するイベントはありません\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "📅 イベント一覧 ({}件)\n", cards.len());
    for card in cards {
        let mark = if card.bookmarked { "★" } else { "☆" };
        let _ = writeln!(out, "{} {}", mark, card.title);

        let details: Vec<&str> = [&card.date, &card.location, &card.event_type, &card.category]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        let _ = writeln!(out, "   {}", details.join("  •  "));

        if !card.price.is_empty() {
            let _ = writeln!(out, "   料金: {}", card.price);
        }
        if !card.link.is_empty() {
            let _ = writeln!(out, "   🔗 {}", card.link);
        }
        let _ = writeln!(out, "   キー: {}\n", card.identity_key);
    }
    out
}

/// ブックマーク一覧（Event / Date / Location / Price）
pub fn render_bookmarks(rows: &[BookmarkRow]) -> String {
    if rows.is_empty() {
        return "ブックマークはまだありません\n".to_string();
    }

    let with_price = rows.iter().any(|r| r.price.is_some());
    let mut headers = vec!["Event", "Date", "Location"];
    if with_price {
        headers.push("Price");
    }

    let table: Vec<Vec<&str>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.event.as_str(), r.date.as_str(), r.location.as_str()];
            if with_price {
                cells.push(r.price.as_deref().unwrap_or(""));
            }
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|i| {
            table
                .iter()
                .map(|cells| cells[i].chars().count())
                .chain([headers[i].len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "🔖 ブックマーク ({}件)\n", rows.len());
    let _ = writeln!(out, "{}", format_row(&headers, &widths));
    let _ = writeln!(
        out,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ")
    );
    for cells in &table {
        let _ = writeln!(out, "{}", format_row(cells, &widths));
    }
    out
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Free vs Paid と上位の場所
pub fn render_analytics(view: &AnalyticsView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "📊 Free vs Paid");
    match &view.price {
        Some(counts) => {
            let max = counts.free.max(counts.paid);
            for (class, n) in counts.ranked() {
                let _ = writeln!(out, "  {:<5} {:>4}  {}", class.to_string(), n, bar(n, max));
            }
        }
        None => {
            let _ = writeln!(out, "  料金列がないため省略します");
        }
    }

    let _ = writeln!(out, "\n📍 開催場所 (上位{}件)", view.top_locations.len());
    if view.top_locations.is_empty() {
        let _ = writeln!(out, "  データがありません");
    }
    let name_width = view
        .top_locations
        .iter()
        .map(|(loc, _)| loc.chars().count())
        .max()
        .unwrap_or(0);
    let max = view.top_locations.first().map(|(_, n)| *n).unwrap_or(0);
    for (location, n) in &view.top_locations {
        let pad = name_width - location.chars().count();
        let _ = writeln!(out, "  {}{} {:>4}  {}", location, " ".repeat(pad), n, bar(*n, max));
    }
    out
}

/// カテゴリ・種別の選択肢
pub fn render_options(categories: &[String], types: &[String]) -> String {
    let mut out = String::new();
    let list = |values: &[String]| {
        if values.is_empty() {
            "(列なし)".to_string()
        } else {
            values.join(", ")
        }
    };
    let _ = writeln!(out, "カテゴリ: {}", list(categories));
    let _ = writeln!(out, "種別: {}", list(types));
    out
}
