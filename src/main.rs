use clap::Parser;
use event_tracker::{cli, config, dataset, error, interactive, render, session};
use cli::{Cli, Commands};
use config::Config;
use event_tracker_common::FilterCriteria;
use session::{Action, Session, View};
use tracing::level_filters::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = Config::load()?;
    let paths = config.clone().with_overrides(cli.data.clone(), cli.bookmarks.clone());

    match cli.command {
        Commands::Init { force } => {
            if dataset::write_sample_dataset(&paths.data_path, force)? {
                println!("✔ サンプルを作成しました: {}", paths.data_path.display());
            } else {
                println!(
                    "既にファイルがあります: {} (上書きするには --force)",
                    paths.data_path.display()
                );
            }
        }

        Commands::List { search, category, event_type, price, json } => {
            let mut session = open_session(&paths)?;
            let criteria = FilterCriteria::new()
                .with_search(search)
                .with_categories(category)
                .with_types(event_type)
                .with_price(price);

            let view = session.handle(Action::Browse(criteria))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else if let View::Events(cards) = view {
                print!("{}", render::render_events(&cards));
            }
        }

        Commands::Options => {
            let mut session = open_session(&paths)?;
            if let View::Options { categories, types } = session.handle(Action::FilterOptions)? {
                print!("{}", render::render_options(&categories, &types));
            }
        }

        Commands::Bookmark { keys } => {
            let mut session = open_session(&paths)?;
            let results = session.bookmark_keys(keys);
            let mut failed = 0;
            for (key, result) in &results {
                match result {
                    Ok(true) => println!("✔ ブックマークしました: {}", key),
                    Ok(false) => println!("ブックマーク済みです: {}", key),
                    Err(err) => {
                        eprintln!("⚠ {}", err);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{}件中{}件のブックマークに失敗しました", results.len(), failed);
            }
        }

        Commands::Bookmarks { remove, select, json } => {
            let mut session = open_session(&paths)?;

            let mut targets = remove;
            if select {
                targets.extend(interactive::select_bookmarks_to_remove(&session)?);
            }
            if select || !targets.is_empty() {
                if targets.is_empty() {
                    println!("削除するブックマークが選択されていません");
                } else if let View::Removed(n) = session.handle(Action::RemoveBookmarks(targets))? {
                    println!("✔ {}件のブックマークを削除しました", n);
                }
            }

            let view = session.handle(Action::ListBookmarks)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else if let View::Bookmarks(rows) = view {
                print!("{}", render::render_bookmarks(&rows));
            }
        }

        Commands::Analytics { top } => {
            let mut session = open_session(&paths)?;
            let top = top.unwrap_or(config.top_locations);
            if let View::Analytics(view) = session.handle(Action::Analytics { top })? {
                print!("{}", render::render_analytics(&view));
            }
        }

        Commands::Browse => {
            let mut session = open_session(&paths)?;
            interactive::run_browse(&mut session)?;
        }

        Commands::Config { show, set_data, set_bookmarks, set_top } => {
            let changed = set_data.is_some() || set_bookmarks.is_some() || set_top.is_some();
            if let Some(path) = set_data {
                config.data_path = path;
            }
            if let Some(path) = set_bookmarks {
                config.bookmark_path = path;
            }
            if let Some(top) = set_top {
                config.set_top_locations(top)?;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  イベントCSV: {}", config.data_path.display());
                println!("  ブックマークCSV: {}", config.bookmark_path.display());
                println!("  場所グラフ件数: {}", config.top_locations);
            }
        }
    }

    Ok(())
}

fn open_session(paths: &Config) -> error::Result<Session> {
    match Session::open(&paths.data_path, &paths.bookmark_path) {
        Ok(session) => Ok(session),
        Err(err) => {
            if let Some(schema) = err.as_schema_error() {
                let missing: Vec<&str> = schema.missing.iter().map(|r| r.as_str()).collect();
                eprintln!("⚠ 必須列が見つかりません: {}", missing.join(", "));
                eprintln!("  CSVの列: {}", schema.found.join(", "));
            }
            Err(err)
        }
    }
}
