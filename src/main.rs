use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wikiquote_search::chat::format_quote;
use wikiquote_search::{AppConfig, ChatBot, LookupOutcome, QuotePicker, QuoteSearch, RandomPicker};

#[derive(Parser)]
#[command(name = "wikiquote")]
#[command(about = "Look up quotes on Wikiquote", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one person or topic
    Search {
        /// Person or topic, e.g. `oscar wilde`
        #[arg(required = true)]
        subject: Vec<String>,

        /// Print every quote instead of a random one
        #[arg(long)]
        all: bool,

        /// Print the lookup outcome as JSON
        #[arg(long, conflicts_with = "all")]
        json: bool,
    },

    /// Answer chat commands read from stdin, one message per line
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only replies
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "wikiquote_search=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Search { subject, all, json } => {
            let search = QuoteSearch::from_app_config(&config)?;
            let query = format!("{} search {}", config.command_prefix, subject.join(" "));
            let outcome = search.lookup(&query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }

            match outcome {
                LookupOutcome::NotFound => {
                    println!("No page found for '{}'", subject.join(" "));
                }
                LookupOutcome::Found { quotes, .. } if quotes.is_empty() => {
                    println!("No quotes found for '{}'", subject.join(" "));
                }
                LookupOutcome::Found { quotes, .. } if all => {
                    for quote in &quotes {
                        println!("{}", quote);
                    }
                }
                LookupOutcome::Found { quotes, .. } => {
                    if let Some(quote) = RandomPicker.pick(&quotes) {
                        println!("{}", format_quote(quote));
                    }
                }
            }
        }

        Commands::Chat => {
            let bot = ChatBot::new(QuoteSearch::from_app_config(&config)?, &config.command_prefix);
            info!("Listening for '{}' commands on stdin", bot.prefix());

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if let Some(reply) = bot.respond(&line).await {
                    println!("{}", reply);
                }
            }

            info!("Session cache: {}", bot.search().stats().await);
        }
    }

    Ok(())
}
