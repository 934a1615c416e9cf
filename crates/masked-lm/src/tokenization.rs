//! Side-by-side tokenization reports for pretrained tokenizers.

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tokenizers::Tokenizer;

/// Sentence used for the tokenizer comparison.
pub const ANALYSIS_SENTENCE: &str = "The cat sat on the mat because it was tired.";

/// Tokenizers compared by the analysis, as (scheme label, Hugging Face repo).
pub const COMPARED_TOKENIZERS: &[(&str, &str)] = &[
    ("BPE (Byte-Pair Encoding)", "gpt2"),
    ("WordPiece", "bert-base-uncased"),
    ("Unigram", "t5-small"),
];

/// How one tokenizer split one sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenizationReport {
    /// Scheme label: "WordPiece"
    pub name: String,
    /// Repository the tokenizer came from: "bert-base-uncased"
    pub tokenizer_id: String,
    pub sentence: String,
    pub tokens: Vec<String>,
    pub token_ids: Vec<u32>,
}

impl TokenizationReport {
    /// Tokenize `sentence` without special tokens.
    ///
    /// Leaving out `[CLS]`/`</s>` and friends keeps the count comparable
    /// across schemes that wrap sequences differently.
    pub fn analyse(
        name: &str,
        tokenizer_id: &str,
        tokenizer: &Tokenizer,
        sentence: &str,
    ) -> Result<Self> {
        let encoding = tokenizer
            .encode(sentence, false)
            .map_err(|e| anyhow::anyhow!("Tokenization failed for {}: {}", tokenizer_id, e))?;

        Ok(Self {
            name: name.to_string(),
            tokenizer_id: tokenizer_id.to_string(),
            sentence: sentence.to_string(),
            tokens: encoding.get_tokens().to_vec(),
            token_ids: encoding.get_ids().to_vec(),
        })
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

impl fmt::Display for TokenizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Tokenization Analysis for: {} ---", self.name)?;
        writeln!(f, "Sentence: {}", self.sentence)?;
        writeln!(f, "Tokens: {:?}", self.tokens)?;
        writeln!(f, "Token IDs: {:?}", self.token_ids)?;
        writeln!(f, "Total Token Count: {}", self.token_count())?;
        writeln!(f, "{}", "-".repeat(50))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::word_level_tokenizer;

    #[test]
    fn test_analyse_fixed_sentence() {
        let tokenizer = word_level_tokenizer();
        let report =
            TokenizationReport::analyse("WordLevel", "test", &tokenizer, "the cat sat on the mat")
                .unwrap();

        assert_eq!(report.tokens, vec!["the", "cat", "sat", "on", "the", "mat"]);
        assert_eq!(report.token_ids, vec![1, 2, 3, 4, 1, 5]);
        assert_eq!(report.token_count(), 6);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let tokenizer = word_level_tokenizer();
        let report =
            TokenizationReport::analyse("WordLevel", "test", &tokenizer, "the dog").unwrap();

        assert_eq!(report.tokens, vec!["the", "[UNK]"]);
        assert_eq!(report.token_ids, vec![1, 0]);
    }

    #[test]
    fn test_display_layout() {
        let tokenizer = word_level_tokenizer();
        let report = TokenizationReport::analyse("WordLevel", "test", &tokenizer, "it was tired .")
            .unwrap();

        let rendered = report.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "--- Tokenization Analysis for: WordLevel ---");
        assert_eq!(lines[1], "Sentence: it was tired .");
        assert_eq!(lines[2], r#"Tokens: ["it", "was", "tired", "."]"#);
        assert_eq!(lines[3], "Token IDs: [8, 9, 10, 11]");
        assert_eq!(lines[4], "Total Token Count: 4");
        assert_eq!(lines[5], "-".repeat(50));
    }

    #[test]
    fn test_compared_tokenizers_cover_three_schemes() {
        let repos: Vec<&str> = COMPARED_TOKENIZERS.iter().map(|(_, repo)| *repo).collect();
        assert_eq!(repos, vec!["gpt2", "bert-base-uncased", "t5-small"]);
    }
}
