use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use insightlens_common::{AppConfig, SearchRequest, SourceTag};
use insightlens_search::Aggregator;
use insightlens_store::InsightStore;

#[derive(Parser)]
#[command(name = "insightlens", about = "Multi-source insight aggregation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch from every source and persist the results.
    Ingest {
        /// Topic to fetch; defaults to each source's own sweep.
        #[arg(long)]
        topic: Option<String>,
        /// Per-source result cap.
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Run the search pipeline and print the JSON response.
    Search {
        keyword: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Restrict stored matches to one source tag, e.g. "rss-feed".
        #[arg(long)]
        source: Option<String>,
        /// Inclusive lower bound on the publish date (YYYY-MM-DD).
        #[arg(long)]
        start_date: Option<String>,
        /// Inclusive upper bound on the publish date (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let store = InsightStore::connect(&config.database_path).await?;
    let aggregator = Aggregator::from_config(&config, store.clone());

    match cli.command {
        Command::Ingest { topic, limit } => {
            let counts = aggregator.ingest(topic.as_deref(), limit).await;
            for (tag, count) in counts {
                println!("{tag}: {count} fetched");
            }
            println!("{} insights stored in total", store.count().await?);
        }
        Command::Search {
            keyword,
            limit,
            offset,
            source,
            start_date,
            end_date,
        } => {
            let source = source
                .map(|s| s.parse::<SourceTag>())
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;

            let request = SearchRequest {
                keyword,
                source,
                limit,
                offset,
                start_date,
                end_date,
            };
            let response = aggregator.handle_search(&request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
