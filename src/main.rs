use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exa_cli::api::AnswerOptions;
use exa_cli::client::{
    ClientOutput, ContentsOptions, ExaClient, ResearchCreateOptions, ResearchGetOptions,
    SearchOptions,
};

#[derive(Parser)]
#[command(name = "exa")]
#[command(about = "Exa search CLI routed through the hosted Exa MCP endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Exa API key
    #[arg(long, env = "EXA_API_KEY", hide_env_values = true)]
    api_key: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Web search
    Search {
        query: String,
        /// Number of results
        #[arg(long, short)]
        num_results: Option<u32>,
        /// Search type (auto, keyword, neural, fast)
        #[arg(long = "type")]
        search_type: Option<String>,
        /// Truncate each result's text to this many characters
        #[arg(long)]
        max_chars: Option<u32>,
    },
    /// Fetch page contents for a URL
    Contents {
        url: String,
        /// Truncate the page text to this many characters
        #[arg(long)]
        max_chars: Option<u32>,
    },
    /// Ask a question, answered with citations
    Answer {
        query: String,
        /// Model variant (exa, exa-pro)
        #[arg(long)]
        model: Option<String>,
        /// JSON schema for a structured answer
        #[arg(long)]
        schema: Option<String>,
    },
    /// Deep research tasks
    Research {
        #[command(subcommand)]
        command: ResearchCommands,
    },
    /// Agentic search driven by an objective
    DeepSearch {
        objective: String,
        /// Seed queries (repeatable)
        #[arg(long, short)]
        query: Vec<String>,
    },
    /// Search code documentation and examples
    CodeContext {
        query: String,
        /// Token budget for the response
        #[arg(long)]
        tokens: Option<u32>,
    },
    /// Research a company
    Company {
        name: String,
        #[arg(long, short)]
        num_results: Option<u32>,
    },
    /// Search LinkedIn
    Linkedin {
        query: String,
        /// profiles or companies
        #[arg(long = "type")]
        search_type: Option<String>,
        #[arg(long, short)]
        num_results: Option<u32>,
    },
    /// List tools advertised by the MCP endpoint
    Tools,
}

#[derive(Subcommand)]
enum ResearchCommands {
    /// Start a research task
    Create {
        instructions: String,
        /// exa-research or exa-research-pro
        #[arg(long)]
        model: Option<String>,
    },
    /// Check a research task
    Get {
        id: String,
        /// Stream task events (not supported over MCP)
        #[arg(long)]
        events: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let client = ExaClient::new(&cli.api_key)?;

    match cli.command {
        Commands::Search {
            query,
            num_results,
            search_type,
            max_chars,
        } => {
            let options = SearchOptions {
                num_results,
                search_type,
                max_characters: max_chars,
            };
            print_output(client.search(&query, &options).await?);
        }
        Commands::Contents { url, max_chars } => {
            let options = ContentsOptions {
                max_characters: max_chars,
            };
            print_output(client.get_contents(&[url], &options).await?);
        }
        Commands::Answer {
            query,
            model,
            schema,
        } => {
            let output_schema = schema
                .map(|s| serde_json::from_str(&s))
                .transpose()
                .map_err(|e| anyhow::anyhow!("invalid --schema JSON: {e}"))?;
            let options = AnswerOptions {
                model,
                output_schema,
                text: None,
            };
            let response = client.answer(&query, &options).await?;

            match &response.answer {
                Value::String(answer) => println!("{answer}"),
                structured => println!("{}", serde_json::to_string_pretty(structured)?),
            }
            if !response.citations.is_empty() {
                println!("\nSources:");
                for citation in &response.citations {
                    match &citation.title {
                        Some(title) => println!("  {} - {}", title, citation.url),
                        None => println!("  {}", citation.url),
                    }
                }
            }
        }
        Commands::Research { command } => match command {
            ResearchCommands::Create {
                instructions,
                model,
            } => {
                let options = ResearchCreateOptions { model };
                print_output(client.research_create(&instructions, &options).await?);
            }
            ResearchCommands::Get { id, events } => {
                let options = ResearchGetOptions { events };
                print_output(client.research_get(&id, &options).await?);
            }
        },
        Commands::DeepSearch { objective, query } => {
            print_output(client.deep_search(&objective, &query).await?);
        }
        Commands::CodeContext { query, tokens } => {
            print_output(client.code_context(&query, tokens).await?);
        }
        Commands::Company { name, num_results } => {
            print_output(client.company_research(&name, num_results).await?);
        }
        Commands::Linkedin {
            query,
            search_type,
            num_results,
        } => {
            print_output(
                client
                    .linkedin_search(&query, search_type.as_deref(), num_results)
                    .await?,
            );
        }
        Commands::Tools => {
            for name in client.available_tools().await? {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn print_output(output: ClientOutput) {
    match output {
        ClientOutput::Text(text) => println!("{text}"),
        ClientOutput::Structured(data) => {
            println!("{}", serde_json::to_string_pretty(&data).unwrap_or_default());
        }
    }
}
