//! Resolution of masked sentences into completed sentences.
//!
//! A [`MaskedSentence`] is split once, at parse time, into the text segments
//! around its placeholder markers. [`resolve`] then stitches the segments back
//! together with the top-ranked candidate for each blank. Because the splice
//! is positional, a candidate whose text happens to contain the marker is
//! never substituted a second time.
//!
//! ```
//! use mask_resolver::{resolve, Candidate, MaskedSentence, PredictionSet};
//!
//! let sentence = MaskedSentence::parse("The cat [MASK] on the mat.", "[MASK]").unwrap();
//! let predictions = PredictionSet::new(vec![vec![
//!     Candidate::new("sat", 0.9),
//!     Candidate::new("sits", 0.05),
//! ]]);
//!
//! let completed = resolve(&sentence, &predictions).unwrap();
//! assert_eq!(completed.as_str(), "The cat sat on the mat.");
//! ```

mod error;
mod prediction;
mod sentence;

pub use error::{PredictionShapeError, ResolveError, ValidationError};
pub use prediction::{Candidate, PredictionSet};
pub use sentence::{CompletedSentence, MaskedSentence, DEFAULT_MARKER};

/// Substitute each blank with the first candidate of its ranking.
///
/// The provider's ordering is trusted as-is: ties are never re-ordered and the
/// first element always wins.
pub fn resolve(
    sentence: &MaskedSentence,
    predictions: &PredictionSet,
) -> Result<CompletedSentence, ResolveError> {
    predictions.validate_for(sentence.blank_count())?;

    let segments = sentence.segments();
    let mut completed = String::with_capacity(sentence.text().len());
    completed.push_str(&segments[0]);

    for (index, segment) in segments[1..].iter().enumerate() {
        // validate_for guarantees a non-empty list per blank
        let top = predictions
            .top(index)
            .ok_or(PredictionShapeError::EmptyCandidates { index })?;
        completed.push_str(top.text.trim());
        completed.push_str(segment);
    }

    Ok(CompletedSentence::new(completed))
}
