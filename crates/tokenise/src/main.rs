//! tokenise: compare how pretrained tokenizers split a sentence, and fill
//! `<mask>` blanks with a hosted or local masked language model.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mask_resolver::MaskedSentence;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use tokenise::analysis::run_analysis;
use tokenise::config::load_dotenv;
use tokenise::{build_provider, fill_mask, Config, JsonSink, Session};

#[derive(Parser, Debug)]
#[command(name = "tokenise")]
#[command(about = "Tokenizer comparison and fill-in-the-blank with masked language models")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Run ModernBERT locally instead of calling the hosted inference API
    #[arg(long, env = "TOKENISE_LOCAL")]
    local: bool,

    /// Model id to use (hosted model, or local repository with --local)
    #[arg(long)]
    model: Option<String>,

    /// Where the raw predictions are written
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Candidates per blank for local inference
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    top_k: Option<u64>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tokenization analysis and exit
    Analyse,
    /// Fill the blanks of one sentence and exit
    Fill {
        /// Sentence containing one or more <mask> markers
        sentence: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so .env can supply clap's env-backed flags too
    let dotenv_path = load_dotenv();
    let args = Args::parse();

    // Logs go to stderr; stdout is the report. RUST_LOG overrides the default.
    let default_filter = if args.verbose {
        "debug,tokenise=debug,masked_lm=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &dotenv_path {
        tracing::debug!("Environment loaded from {}", path.display());
    }

    let mut config = Config::from_env()?;
    apply_overrides(&mut config, &args);
    tracing::debug!("Predictions file: {}", config.output_path.display());

    let mut stdout = std::io::stdout();

    match args.command {
        Some(Command::Analyse) => {
            run_analysis(&config, &mut stdout).await?;
        }
        Some(Command::Fill { sentence }) => {
            let sentence = MaskedSentence::parse(&sentence, &config.marker)?;
            let provider = build_provider(&config, args.local)?;
            let sink = JsonSink::new(config.output_path.clone());
            fill_mask(provider.as_ref(), &sink, &sentence, &mut stdout)
                .await
                .context("Fill-mask failed")?;
        }
        None => {
            let provider = build_provider(&config, args.local);
            if let Err(err) = &provider {
                tracing::debug!("Fill-mask unavailable: {}", err);
            }
            let stdin = BufReader::new(tokio::io::stdin());
            Session::new(stdin, stdout, config, provider).run().await?;
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(model) = &args.model {
        if args.local {
            config.local_model = model.clone();
        } else {
            config.hosted_model = model.clone();
        }
    }
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(top_k) = args.top_k {
        config.top_k = usize::try_from(top_k).unwrap_or(usize::MAX);
    }
}
