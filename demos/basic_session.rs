//! Basic engine walkthrough: ingest, query, edit through a filtered view,
//! undo, export.
//!
//! Run with: cargo run --example basic_session

use std::collections::HashMap;
use worktable::{CellValue, Engine, QueryScope, Request, Response};

fn row(pairs: &[(&str, CellValue)]) -> HashMap<String, CellValue> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn show(responses: &[Response]) {
    for response in responses {
        match response {
            Response::DataLoaded { rows, .. } => println!("loaded {} rows", rows.len()),
            Response::DataUpdated { columns, rows } => {
                println!("view ({}): {} rows", columns.join(", "), rows.len());
                for r in rows {
                    let line: Vec<String> = columns
                        .iter()
                        .map(|c| {
                            r.get(c)
                                .map(|v| v.display().into_owned())
                                .unwrap_or_default()
                        })
                        .collect();
                    println!("  {} | {}", r.id, line.join(" | "));
                }
            }
            Response::CommandResult { stats } => println!("stats: {stats:?}"),
            Response::ExportReady { content, format, .. } => {
                println!("export ({format}):\n{content}")
            }
            Response::HistoryState { can_undo, can_redo } => {
                println!("history: undo={can_undo} redo={can_redo}")
            }
            Response::PersistNeeded => println!("(persist signal)"),
            Response::Snapshot { rows, .. } => println!("snapshot of {} rows", rows.len()),
            Response::Error { message } => println!("error: {message}"),
        }
    }
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let mut engine = Engine::default();
    let mut send = |request: Request| show(&engine.handle(request));

    send(Request::LoadFile {
        columns: vec!["name".to_string(), "points".to_string()],
        rows: vec![
            row(&[("name", "Ada".into()), ("points", CellValue::Number(31.0))]),
            row(&[("name", "Grace".into()), ("points", CellValue::Number(47.0))]),
            row(&[("name", "Edsger".into()), ("points", "NA".into())]),
            row(&[("name", "Barbara".into()), ("points", CellValue::Number(47.0))]),
        ],
    });

    let command = |text: &str| Request::RunCommand {
        text: text.to_string(),
        scope: QueryScope::CurrentView,
    };

    send(command("FILTER points >= 40"));
    send(command("SORT name ASC"));

    // Edits through the filtered view reach the master dataset
    send(Request::EditCell {
        view_index: 0,
        column: "points".to_string(),
        value: CellValue::Number(50.0),
    });
    send(Request::Undo);

    send(Request::Reset);
    send(command("STATS points"));
    send(command("EXPORT md"));
}
