use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use storefront_core::SearchResult;

use crate::commands::{CommandResult, JsonFileCatalog, RunContext};

const COMMAND: &str = "search";

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    #[arg(long, help = "Path to a JSON array of catalog items")]
    pub catalog: PathBuf,
    #[arg(long, help = "Free-text search query")]
    pub query: String,
    #[arg(long, help = "Maximum number of results (capped by search.max_results)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SearchData {
    query: String,
    result_count: usize,
    results: Vec<SearchResult>,
}

pub fn run(args: &SearchArgs, context: &RunContext) -> CommandResult {
    let mut storefront = context.storefront(JsonFileCatalog::new(&args.catalog));

    match storefront.search(&args.query, args.limit) {
        Ok(results) => {
            let message = format!("{} result(s) for `{}`", results.len(), args.query.trim());
            CommandResult::success_with_data(
                COMMAND,
                message,
                SearchData { query: args.query.clone(), result_count: results.len(), results },
            )
        }
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}
