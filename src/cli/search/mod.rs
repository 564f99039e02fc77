//! Search command - one search through the cache, result on stdout

use clap::Args;
use tracing::debug;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::services::SearchServiceTrait;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// artist, album or track
    pub kind: String,

    /// Search text
    pub query: String,

    /// Treat the query as already percent-encoded
    #[arg(long)]
    pub raw: bool,
}

impl SearchArgs {
    /// The query as it would appear in a request path
    pub fn raw_query(&self) -> String {
        if self.raw {
            self.query.clone()
        } else {
            urlencoding::encode(&self.query).into_owned()
        }
    }
}

pub async fn run(args: SearchArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let components = crate::build_components(&config).await?;
    let raw_query = args.raw_query();
    debug!(kind = %args.kind, raw_query = %raw_query, "Running one-shot search");

    let result = components.search_service.search(&raw_query, &args.kind).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
