use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use storefront_core::{
    CatalogItem, JitterSource, NoJitter, RandomJitter, UserBrowsingContext,
};

use crate::commands::{read_json, CommandResult, JsonFileCatalog, RunContext};

const COMMAND: &str = "recommend";

#[derive(Debug, Clone, Args)]
pub struct RecommendArgs {
    #[arg(long, help = "Path to a JSON array of catalog items")]
    pub catalog: PathBuf,
    #[arg(long, help = "Path to a JSON browsing context; omitted means an empty context")]
    pub context: Option<PathBuf>,
    #[arg(long, help = "Number of picks (defaults to recommendations.default_limit)")]
    pub limit: Option<usize>,
    #[arg(long, help = "Seed the jitter so repeated runs return the same picks")]
    pub seed: Option<u64>,
    #[arg(long, conflicts_with = "seed", help = "Disable jitter and rank by base score only")]
    pub no_jitter: bool,
}

#[derive(Debug, Serialize)]
struct RecommendData {
    result_count: usize,
    picks: Vec<CatalogItem>,
}

pub fn run(args: &RecommendArgs, context: &RunContext) -> CommandResult {
    let browsing = match &args.context {
        Some(path) => match read_json::<UserBrowsingContext>(path) {
            Ok(browsing) => browsing,
            Err(error) => return CommandResult::from_error(COMMAND, &error),
        },
        None => UserBrowsingContext::new(),
    };

    let mut jitter: Box<dyn JitterSource> = if args.no_jitter {
        Box::new(NoJitter)
    } else if let Some(seed) = args.seed {
        Box::new(RandomJitter::seeded(seed))
    } else {
        Box::new(RandomJitter::from_entropy())
    };

    let mut storefront = context.storefront(JsonFileCatalog::new(&args.catalog));
    match storefront.recommend(&browsing, args.limit, jitter.as_mut()) {
        Ok(picks) => CommandResult::success_with_data(
            COMMAND,
            format!("{} recommendation(s)", picks.len()),
            RecommendData { result_count: picks.len(), picks },
        ),
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}
