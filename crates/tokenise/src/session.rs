//! The interactive menu loop and the fill-in-the-blank flow it drives.

use anyhow::Result;
use mask_resolver::{resolve, CompletedSentence, MaskedSentence, ValidationError};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::analysis::run_analysis;
use crate::commands::{choice_list, dispatch, render_menu, Action};
use crate::config::{Config, ConfigError};
use crate::providers::PredictionProvider;
use crate::sink::JsonSink;

/// Predict the blanks of `sentence`, persist the raw predictions and print
/// the completed sentence.
pub async fn fill_mask<W: Write>(
    provider: &dyn PredictionProvider,
    sink: &JsonSink,
    sentence: &MaskedSentence,
    out: &mut W,
) -> Result<CompletedSentence> {
    writeln!(out, "--- Querying Fill-Mask API for: {} ---", provider.name())?;
    writeln!(out, "Input Sentence: {}", sentence)?;

    let prediction = provider.predict(sentence).await?;

    let path = sink.save(&prediction.raw).await?;
    writeln!(out, "Successfully received predictions and saved to {}", path.display())?;

    let completed = resolve(sentence, &prediction.predictions)?;
    writeln!(out, "\n--- Prediction Result ---")?;
    writeln!(out, "Completed Sentence: {}\n", completed)?;

    tracing::debug!("Resolved {} blank(s)", sentence.blank_count());
    Ok(completed)
}

/// Menu-driven session reading lines from `R` and reporting to `W`.
pub struct Session<R, W> {
    input: Lines<R>,
    out: W,
    config: Config,
    provider: Result<Box<dyn PredictionProvider>, ConfigError>,
    sink: JsonSink,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// `provider` is an error when fill-mask is unavailable (no API token);
    /// the error is shown each time the user picks it.
    pub fn new(
        input: R,
        out: W,
        config: Config,
        provider: Result<Box<dyn PredictionProvider>, ConfigError>,
    ) -> Self {
        let sink = JsonSink::new(config.output_path.clone());
        Self {
            input: input.lines(),
            out,
            config,
            provider,
            sink,
        }
    }

    /// Run the main menu until the user exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        let prompt = format!("Please enter your choice ({}): ", choice_list());

        loop {
            write!(self.out, "{}", render_menu())?;
            let Some(choice) = read_line(&mut self.input, &mut self.out, &prompt).await? else {
                tracing::debug!("Input closed, leaving menu");
                return Ok(());
            };

            match dispatch(&choice) {
                Some(Action::Analyse) => {
                    if let Err(err) = run_analysis(&self.config, &mut self.out).await {
                        writeln!(self.out, "Error: {:#}", err)?;
                    }
                }
                Some(Action::FillMask) => {
                    if !self.fill_in_the_blank().await? {
                        return Ok(());
                    }
                }
                Some(Action::Exit) => {
                    writeln!(self.out, "Exiting program. Goodbye!")?;
                    return Ok(());
                }
                None => {
                    writeln!(self.out, "Invalid choice. Please enter {}.", choice_list())?;
                }
            }
        }
    }

    /// Prompt for sentences until `back`. Returns false if input ended.
    async fn fill_in_the_blank(&mut self) -> Result<bool> {
        let Self {
            input,
            out,
            config,
            provider,
            sink,
        } = self;

        let provider = match provider {
            Ok(provider) => &**provider,
            Err(err) => {
                writeln!(out, "\nError: {}", err)?;
                return Ok(true);
            }
        };

        loop {
            writeln!(
                out,
                "\nEnter a sentence with one or more {} tokens to get predictions.",
                config.marker
            )?;
            writeln!(out, "(Type 'back' to return to the main menu)")?;

            let Some(line) = read_line(input, out, "> ").await? else {
                return Ok(false);
            };

            if line.trim().eq_ignore_ascii_case("back") {
                return Ok(true);
            }

            let sentence = match MaskedSentence::parse(&line, &config.marker) {
                Ok(sentence) => sentence,
                Err(ValidationError::NoMarker { marker }) => {
                    writeln!(
                        out,
                        "Error: Your sentence must include at least one '{}' token.",
                        marker
                    )?;
                    continue;
                }
                Err(err) => {
                    writeln!(out, "Error: {}", err)?;
                    continue;
                }
            };

            if let Err(err) = fill_mask(provider, sink, &sentence, out).await {
                tracing::warn!("Fill-mask request failed: {:#}", err);
                writeln!(out, "Error: {:#}", err)?;
            }
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

/// Print `prompt` and read one line. `None` once input is exhausted.
async fn read_line<R, W>(input: &mut Lines<R>, out: &mut W, prompt: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}", prompt)?;
    out.flush()?;
    Ok(input.next_line().await?)
}
