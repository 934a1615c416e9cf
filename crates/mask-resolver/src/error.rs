use thiserror::Error;

/// The masked sentence itself is unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("sentence must include at least one '{marker}' token")]
    NoMarker { marker: String },

    #[error("placeholder marker cannot be empty")]
    EmptyMarker,
}

/// The predictions do not line up with the blanks of the sentence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionShapeError {
    #[error("expected predictions for {expected} blank(s), provider returned {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("no candidates returned for blank {index}")]
    EmptyCandidates { index: usize },

    #[error("top candidate for blank {index} has invalid score {score}")]
    InvalidScore { index: usize, score: f32 },
}

impl PredictionShapeError {
    /// Blank index the error refers to, when it concerns a single blank.
    pub fn index(&self) -> Option<usize> {
        match self {
            PredictionShapeError::CountMismatch { .. } => None,
            PredictionShapeError::EmptyCandidates { index }
            | PredictionShapeError::InvalidScore { index, .. } => Some(*index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("invalid sentence: {0}")]
    Validation(#[from] ValidationError),

    #[error("malformed predictions: {0}")]
    PredictionShape(#[from] PredictionShapeError),
}
