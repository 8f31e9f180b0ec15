//! Drive the engine on its dedicated thread through the message channel,
//! the way an interactive host would.
//!
//! Run with: cargo run --example worker_session

use std::collections::HashMap;
use worktable::{CellValue, EngineConfig, QueryScope, Request, Response};

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));

    let worker = worktable::spawn(EngineConfig::default());

    let rows: Vec<HashMap<String, CellValue>> = (1..=100)
        .map(|n| {
            let mut row = HashMap::new();
            row.insert("n".to_string(), CellValue::Number(n as f64));
            row.insert(
                "parity".to_string(),
                CellValue::Text(if n % 2 == 0 { "even" } else { "odd" }.to_string()),
            );
            row
        })
        .collect();

    let batch = worker
        .request(Request::LoadFile {
            columns: vec!["n".to_string(), "parity".to_string()],
            rows,
        })
        .expect("engine thread alive");
    println!("load produced {} responses", batch.len());

    let batch = worker
        .request(Request::RunCommand {
            text: "FILTER parity = even".to_string(),
            scope: QueryScope::CurrentView,
        })
        .expect("engine thread alive");
    if let Some(Response::DataUpdated { rows, .. }) = batch.first() {
        println!("even rows: {}", rows.len());
    }

    let batch = worker
        .request(Request::RunCommand {
            text: "STATS n".to_string(),
            scope: QueryScope::CurrentView,
        })
        .expect("engine thread alive");
    if let Some(Response::CommandResult { stats }) = batch.first() {
        println!("count={} sum={} avg={}", stats.count, stats.sum, stats.avg);
    }

    // Mutations answer with the updated view plus a persist signal
    let batch = worker
        .request(Request::DeleteRow { view_index: 0 })
        .expect("engine thread alive");
    println!(
        "delete answered with {} responses (persist: {})",
        batch.len(),
        batch.iter().any(|r| matches!(r, Response::PersistNeeded))
    );

    let batch = worker.request(Request::Undo).expect("engine thread alive");
    println!(
        "undo answered, history state: {:?}",
        batch
            .iter()
            .find(|r| matches!(r, Response::HistoryState { .. }))
    );

    worker.shutdown();
    println!("engine thread stopped");
}
