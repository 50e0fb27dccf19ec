//! Prediction derivation: state label, confidence and odds.
//!
//! The classifier returns a probability pair; everything presented to the
//! operator is derived here. Odds are the winning probability over the
//! losing one, clamped to `MAX_ODDS` when the loser is exactly zero so the
//! loop never divides by zero.

/// Sentinel odds value used when the losing probability is exactly zero.
pub const MAX_ODDS: f64 = 1.0e6;

/// Threshold above which a class wins outright.
const DECISION_THRESHOLD: f64 = 0.5;

/// Discrete mental state derived from a probability pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentalState {
    Relaxed,
    Concentrating,
    /// Neither class is above the decision threshold (including exact ties)
    Unknown,
}

impl std::fmt::Display for MentalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MentalState::Relaxed => write!(f, "Relaxed"),
            MentalState::Concentrating => write!(f, "Concentrating"),
            MentalState::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One classification result, derived fresh each loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub p_relaxed: f64,
    pub p_concentrating: f64,
    pub state: MentalState,
    /// Winning class probability
    pub confidence: f64,
    /// Winning over losing probability, clamped to `MAX_ODDS`
    pub odds: f64,
}

impl Prediction {
    /// Derive a prediction from a `[p_relaxed, p_concentrating]` pair.
    pub fn from_probabilities(probs: [f64; 2]) -> Self {
        let [p_relaxed, p_concentrating] = probs;

        let state = if p_relaxed > DECISION_THRESHOLD {
            MentalState::Relaxed
        } else if p_concentrating > DECISION_THRESHOLD {
            MentalState::Concentrating
        } else {
            MentalState::Unknown
        };

        let (winner, loser) = if p_relaxed >= p_concentrating {
            (p_relaxed, p_concentrating)
        } else {
            (p_concentrating, p_relaxed)
        };

        let odds = if loser == 0.0 {
            MAX_ODDS
        } else {
            (winner / loser).min(MAX_ODDS)
        };

        Self {
            p_relaxed,
            p_concentrating,
            state,
            confidence: winner,
            odds,
        }
    }

    /// Render a single status line suitable for `\r` overwriting.
    pub fn status_line(&self) -> String {
        match self.state {
            MentalState::Unknown => format!("State: {}", self.state),
            _ => format!(
                "State: {} (Confidence: {:.2}%, Odds: {:.2})",
                self.state,
                self.confidence * 100.0,
                self.odds
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relaxed_state() {
        let p = Prediction::from_probabilities([0.7, 0.3]);
        assert_eq!(p.state, MentalState::Relaxed);
        assert_eq!(p.confidence, 0.7);
        assert!((p.odds - 0.7 / 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_concentrating_state() {
        let p = Prediction::from_probabilities([0.3, 0.7]);
        assert_eq!(p.state, MentalState::Concentrating);
        assert_eq!(p.confidence, 0.7);
    }

    #[test]
    fn test_exact_tie_is_unknown() {
        let p = Prediction::from_probabilities([0.5, 0.5]);
        assert_eq!(p.state, MentalState::Unknown);
        assert_eq!(p.status_line(), "State: Unknown");
    }

    #[test]
    fn test_odds_clamped_on_zero_loser() {
        let p = Prediction::from_probabilities([1.0, 0.0]);
        assert_eq!(p.state, MentalState::Relaxed);
        assert_eq!(p.odds, MAX_ODDS);
    }

    #[test]
    fn test_status_line_format() {
        let p = Prediction::from_probabilities([0.7, 0.3]);
        assert_eq!(
            p.status_line(),
            "State: Relaxed (Confidence: 70.00%, Odds: 2.33)"
        );
    }
}
