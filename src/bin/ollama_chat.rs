//! Ask the local model questions from the terminal

use anyhow::Context;
use chain_gateway::{
    backend::create_text_backend,
    chain::presets::{question_chain, question_input},
    config::{BackendConfig, LoggingConfig, ProtocolType},
    logging,
};
use clap::Parser;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "ollama-chat", version, about = "Query a local Ollama model")]
struct Args {
    /// Question to ask; omit it to be prompted interactively
    question: Option<String>,

    /// Ollama server address
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    base_url: String,

    /// Model to run
    #[arg(long, env = "OLLAMA_MODEL", default_value = "llama3")]
    model: String,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 60000)]
    timeout_ms: u64,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_tracing(&LoggingConfig {
        level: args.log_level.clone(),
        format: "pretty".to_string(),
    });

    let backend = create_text_backend(&BackendConfig {
        name: "ollama".to_string(),
        protocol: ProtocolType::Ollama,
        base_url: args.base_url.clone(),
        model: args.model.clone(),
        timeout_ms: args.timeout_ms,
        ..Default::default()
    })?;
    let chain = question_chain(backend)?;

    if let Some(input) = args.question.as_deref().and_then(question_input) {
        let answer = chain.invoke(&input).await?;
        println!("{}", answer);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Enter Your Query: ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(input) = question_input(&line) else {
            continue;
        };

        let answer = chain.invoke(&input).await?;
        println!("{}\n", answer);
    }

    Ok(())
}
