use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::AppConfig;
use crate::query::QueryEngine;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer once; omit to start an interactive session
    pub query: Option<String>,
}

pub async fn run(config: &AppConfig, args: AskArgs) -> Result<()> {
    let engine = QueryEngine::from_config(config).context("Query engine failed to initialize")?;

    match args.query {
        Some(query) => {
            println!("{}", engine.process_query(&query).await);
            Ok(())
        }
        None => interactive(&engine).await,
    }
}

/// Read queries line by line until `exit`, `quit`, EOF or Ctrl-C.
async fn interactive(engine: &QueryEngine) -> Result<()> {
    info!(sections = engine.store().len(), "Ready for queries");
    println!("輸入查詢，例如：'食鹽 結塊'。輸入 'exit' 或 'quit' 結束。");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n您的查詢: ");
        std::io::stdout().flush().ok();

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let answer = engine.process_query(query).await;
        println!("\n========== 查詢結果 ==========");
        println!("{}", answer);
        println!("==============================");
    }

    info!("Session ended");
    Ok(())
}
