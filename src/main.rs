use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use convoscope_agents::{
    Config, ConversationTurn, ConvoAgent, ConvoOutcome, ConvoRequest, KgQuery,
    KnowledgeGraphClient, OpenAiChatClient, SearchTool, WakeWordDetector,
};

/// Convoscope - agent pipelines for a language-learning assistant
#[derive(Parser)]
#[command(name = "convoscope", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the web and print the aggregated agent context
    Search {
        /// Search query
        query: String,
        /// Use the blocking entry point
        #[arg(long)]
        blocking: bool,
    },
    /// Ask the conversation agent for the next line
    Convo {
        /// Target language (use "Chinese (Pinyin)" for romanized output)
        #[arg(short, long, default_value = "Russian")]
        language: String,
        /// Learner fluency level
        #[arg(short, long, default_value = "35")]
        fluency: u32,
        /// Nearby point of interest (repeatable)
        #[arg(short, long = "place")]
        places: Vec<String>,
        /// Conversation turn as `role:text` (repeatable, in order)
        #[arg(short, long = "turn", value_parser = parse_turn)]
        turns: Vec<ConversationTurn>,
    },
    /// Check a transcript for a wake word
    Wake {
        /// Transcript text
        transcript: String,
    },
    /// Look up an entity in the public knowledge graph
    Kg {
        /// Entity query
        query: String,
        /// Language code (repeatable)
        #[arg(long = "language")]
        languages: Vec<String>,
        /// schema.org type (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,
        /// Number of entities
        #[arg(long)]
        limit: Option<u32>,
        /// Use the blocking entry point (errors are reported instead of skipped)
        #[arg(long)]
        blocking: bool,
    },
}

fn parse_turn(value: &str) -> Result<ConversationTurn, String> {
    value
        .split_once(':')
        .map(|(role, text)| ConversationTurn::new(role.trim(), text.trim()))
        .ok_or_else(|| format!("expected role:text, got {value:?}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,convoscope_agents=info",
        1 => "info,convoscope_agents=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    tracing::debug!(search = ?config.search, llm = ?config.llm, "loaded configuration");
    Ok(config)
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Wake { transcript } => {
            let detector = WakeWordDetector::default();
            match detector.explicit_query(&transcript) {
                Some(found) => println!("{}", found.query.trim()),
                None => println!("no wake word"),
            }
        }
        Command::Search { query, blocking } => {
            let config = load_config()?;
            let tool = SearchTool::new(config.serper_api_key()?.to_string(), config.search)?;
            let output = if blocking {
                tokio::task::spawn_blocking(move || tool.run_blocking(&query))
                    .await
                    .context("search task panicked")??
            } else {
                tool.run(&query).await?
            };
            print!("{output}");
        }
        Command::Convo {
            language,
            fluency,
            places,
            turns,
        } => {
            let config = load_config()?;
            let llm = OpenAiChatClient::new(config.openai_api_key()?.to_string(), &config.llm)?;
            let agent = ConvoAgent::new(llm).with_temperature(config.llm.temperature);
            let request = ConvoRequest {
                places,
                target_language: language,
                fluency_level: fluency,
                conversation_history: turns,
            };

            match agent.respond(&request).await? {
                ConvoOutcome::Reply(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
                ConvoOutcome::ParseFailure(e) => anyhow::bail!("{e}"),
            }
        }
        Command::Kg {
            query,
            languages,
            types,
            limit,
            blocking,
        } => {
            let config = load_config()?;
            let (project, token) = config.gcp_credentials()?;
            let client = KnowledgeGraphClient::new(
                project.to_string(),
                token.to_string(),
                config.knowledge_graph,
            )?;
            let query = KgQuery {
                query,
                languages: (!languages.is_empty()).then_some(languages),
                types: (!types.is_empty()).then_some(types),
                limit,
            };

            let response = if blocking {
                Some(
                    tokio::task::spawn_blocking(move || client.search_blocking(&query))
                        .await
                        .context("knowledge graph task panicked")??,
                )
            } else {
                client.search(&query).await
            };

            match response {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => println!("no result"),
            }
        }
    }

    Ok(())
}
