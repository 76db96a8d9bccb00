use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// One weight per similarity signal.
///
/// Equal thirds are a placeholder until weights can be learned from user
/// feedback; callers inject them through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub language: f64,
    pub topic: f64,
    pub readme: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            language: 1.0 / 3.0,
            topic: 1.0 / 3.0,
            readme: 1.0 / 3.0,
        }
    }
}

impl SignalWeights {
    /// Weights must be finite and nonnegative
    pub fn new(language: f64, topic: f64, readme: f64) -> AppResult<Self> {
        for (name, weight) in [("language", language), ("topic", topic), ("readme", readme)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "{} weight must be a nonnegative number, got {}",
                    name, weight
                )));
            }
        }
        Ok(Self {
            language,
            topic,
            readme,
        })
    }

    pub fn sum(&self) -> f64 {
        self.language + self.topic + self.readme
    }
}

/// The three similarity signals of one candidate repository
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalScores {
    pub repository: String,
    pub language: f64,
    pub topic: f64,
    pub readme: f64,
}

impl SignalScores {
    fn weighted(&self, weights: &SignalWeights) -> f64 {
        self.language * weights.language + self.topic * weights.topic + self.readme * weights.readme
    }
}

/// A candidate with its combined, normalized score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRepository {
    pub score: f64,
    pub signals: SignalScores,
}

/// Min-max scales values to [0, 1]. A series whose values are all equal
/// is returned unchanged.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if values.is_empty() || range == 0.0 || !range.is_finite() {
        return values.to_vec();
    }

    values.iter().map(|v| (v - min) / range).collect()
}

/// Blends the signals with `weights`, normalizes the result and ranks it
/// best first. Equal scores are ordered by repository name.
pub fn combine(scores: Vec<SignalScores>, weights: &SignalWeights) -> Vec<RankedRepository> {
    let blended: Vec<f64> = scores.iter().map(|s| s.weighted(weights)).collect();
    let normalized = normalize(&blended);

    let mut ranked: Vec<RankedRepository> = scores
        .into_iter()
        .zip(normalized)
        .map(|(signals, score)| RankedRepository { score, signals })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.signals.repository.cmp(&b.signals.repository))
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(repository: &str, language: f64, topic: f64, readme: f64) -> SignalScores {
        SignalScores {
            repository: repository.to_string(),
            language,
            topic,
            readme,
        }
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((SignalWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        assert!(SignalWeights::new(-1.0, 0.5, 0.5).is_err());
        assert!(SignalWeights::new(f64::NAN, 0.5, 0.5).is_err());
        assert!(SignalWeights::new(0.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_normalize_range() {
        assert_eq!(normalize(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(normalize(&[-1.0, 1.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(&[0.3, -0.2, 0.9, 0.1]);
        assert_eq!(normalize(&once), once);
        assert_eq!(normalize(&[0.0, 0.25, 1.0]), vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn test_normalize_constant_series_unchanged() {
        assert_eq!(normalize(&[0.4, 0.4, 0.4]), vec![0.4, 0.4, 0.4]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_combine_sorts_descending() {
        let ranked = combine(
            vec![
                scores("a/low", 0.0, 0.0, 0.1),
                scores("a/high", 0.9, 1.0, 0.8),
                scores("a/mid", 0.5, 0.2, 0.4),
            ],
            &SignalWeights::default(),
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.signals.repository.as_str()).collect();
        assert_eq!(names, vec!["a/high", "a/mid", "a/low"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[2].score, 0.0);
    }

    #[test]
    fn test_weights_change_ranking() {
        let candidates = vec![scores("x/lang", 1.0, 0.0, 0.0), scores("x/topic", 0.0, 1.0, 0.0)];
        let ranked = combine(candidates, &SignalWeights::new(0.0, 1.0, 0.0).unwrap());
        assert_eq!(ranked[0].signals.repository, "x/topic");
    }

    #[test]
    fn test_ties_ordered_by_name() {
        let ranked = combine(
            vec![scores("b/two", 0.5, 0.5, 0.5), scores("a/one", 0.5, 0.5, 0.5)],
            &SignalWeights::default(),
        );
        assert_eq!(ranked[0].signals.repository, "a/one");
        assert_eq!(ranked[1].signals.repository, "b/two");
    }
}
