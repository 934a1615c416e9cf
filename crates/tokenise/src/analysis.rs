//! Tokenization analysis: how BPE, WordPiece and Unigram split one sentence.

use anyhow::{Context, Result};
use masked_lm::{load_tokenizer, TokenizationReport, ANALYSIS_SENTENCE, COMPARED_TOKENIZERS};
use std::io::Write;

use crate::config::Config;
use crate::download::download_repo_files;

const TOKENIZER_FILE: &str = "tokenizer.json";

/// Download each compared tokenizer and print its report to `out`.
pub async fn run_analysis<W: Write>(config: &Config, out: &mut W) -> Result<Vec<TokenizationReport>> {
    writeln!(out, "\n--- Starting Tokenization Analysis ---")?;

    let mut reports = Vec::with_capacity(COMPARED_TOKENIZERS.len());
    for (name, repo) in COMPARED_TOKENIZERS {
        let report = analyse_repo(config, name, repo)
            .await
            .with_context(|| format!("Tokenization analysis failed for {}", repo))?;

        writeln!(out, "{}", report)?;
        reports.push(report);
    }

    Ok(reports)
}

async fn analyse_repo(config: &Config, name: &str, repo: &str) -> Result<TokenizationReport> {
    let dir = download_repo_files(repo, &[TOKENIZER_FILE], &config.repo_dir(repo)).await?;
    let tokenizer = load_tokenizer(&dir.join(TOKENIZER_FILE))?;

    let report = TokenizationReport::analyse(name, repo, &tokenizer, ANALYSIS_SENTENCE)?;
    tracing::debug!("{} produced {} tokens", repo, report.token_count());
    Ok(report)
}
