use serde::{Deserialize, Serialize};

use crate::error::PredictionShapeError;

/// A predicted replacement for one blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Replacement text as the provider decoded it (may carry whitespace)
    pub text: String,
    /// Confidence in [0, 1]
    pub score: f32,
}

impl Candidate {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Ranked candidates for every blank of one sentence, in blank order.
///
/// Each inner list is kept in the order the provider returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionSet {
    blanks: Vec<Vec<Candidate>>,
}

impl PredictionSet {
    pub fn new(blanks: Vec<Vec<Candidate>>) -> Self {
        Self { blanks }
    }

    /// Number of per-blank candidate lists.
    pub fn len(&self) -> usize {
        self.blanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blanks.is_empty()
    }

    /// Candidates for blank `index`.
    pub fn candidates(&self, index: usize) -> Option<&[Candidate]> {
        self.blanks.get(index).map(Vec::as_slice)
    }

    /// First-ranked candidate for blank `index`.
    pub fn top(&self, index: usize) -> Option<&Candidate> {
        self.blanks.get(index).and_then(|list| list.first())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Candidate]> {
        self.blanks.iter().map(Vec::as_slice)
    }

    /// Check that there is exactly one usable ranking per blank.
    pub fn validate_for(&self, blank_count: usize) -> Result<(), PredictionShapeError> {
        if self.blanks.len() != blank_count {
            return Err(PredictionShapeError::CountMismatch {
                expected: blank_count,
                actual: self.blanks.len(),
            });
        }

        for (index, list) in self.blanks.iter().enumerate() {
            let top = list
                .first()
                .ok_or(PredictionShapeError::EmptyCandidates { index })?;
            if !top.score.is_finite() || !(0.0..=1.0).contains(&top.score) {
                return Err(PredictionShapeError::InvalidScore {
                    index,
                    score: top.score,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_matching_shape() {
        let set = PredictionSet::new(vec![
            vec![Candidate::new("dog", 0.8), Candidate::new("cat", 0.1)],
            vec![Candidate::new("store", 0.7)],
        ]);
        assert!(set.validate_for(2).is_ok());
        assert_eq!(set.top(1).map(|c| c.text.as_str()), Some("store"));
    }

    #[test]
    fn test_validate_reports_first_empty_list() {
        let set = PredictionSet::new(vec![vec![], vec![]]);
        let err = set.validate_for(2).unwrap_err();
        assert_eq!(err, PredictionShapeError::EmptyCandidates { index: 0 });
        assert_eq!(err.index(), Some(0));
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let set = PredictionSet::new(vec![vec![Candidate::new("dog", 1.5)]]);
        assert!(matches!(
            set.validate_for(1),
            Err(PredictionShapeError::InvalidScore { index: 0, .. })
        ));
    }

    #[test]
    fn test_serializes_as_nested_lists() {
        let set = PredictionSet::new(vec![vec![Candidate::new("sat", 0.5)]]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!([[{"text": "sat", "score": 0.5}]]));
    }
}
