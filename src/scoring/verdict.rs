//! Verdict combination.
//!
//! Merges the similarity score and the NLI label into a final score and a
//! qualitative hallucination judgment. The deduction multipliers and the
//! judgment threshold are tuning values carried from the reference data,
//! exposed as policy configuration rather than constants.

use serde::{Deserialize, Serialize};

use crate::retrieve::EvidenceCandidate;

use super::nli::{NliJudgment, NliLabel};

/// Judgment for a final score at or above the threshold.
pub const JUDGMENT_LOW: &str = "low hallucination likelihood";
/// Judgment for a final score below the threshold.
pub const JUDGMENT_POSSIBLE: &str = "possible hallucination";

/// Scoring policy for verdict combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictPolicy {
    /// Final scores at or above this are judged unlikely hallucinations
    pub hallucination_threshold: f64,
    /// Fraction of similarity deducted on contradiction
    pub contradiction_penalty: f64,
    /// Fraction of similarity deducted on neutral
    pub neutral_penalty: f64,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self {
            hallucination_threshold: 0.7,
            contradiction_penalty: 0.5,
            neutral_penalty: 0.25,
        }
    }
}

impl VerdictPolicy {
    /// Final score: similarity minus the label-dependent deduction,
    /// clamped to be non-negative. Entailment and classification errors
    /// deduct nothing.
    pub fn combine(&self, similarity: f64, label: NliLabel) -> f64 {
        let deduction = match label {
            NliLabel::Contradiction => similarity * self.contradiction_penalty,
            NliLabel::Neutral => similarity * self.neutral_penalty,
            NliLabel::Entailment | NliLabel::Error => 0.0,
        };
        (similarity - deduction).max(0.0)
    }

    /// Qualitative judgment for a final score.
    pub fn judgment(&self, final_score: f64) -> &'static str {
        if final_score >= self.hallucination_threshold {
            JUDGMENT_LOW
        } else {
            JUDGMENT_POSSIBLE
        }
    }
}

/// An evidence candidate with every verdict signal attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: EvidenceCandidate,
    /// Rank in the retrieval ordering, 0-based; the stable tie-break key
    pub retrieval_rank: usize,
    /// Embedding similarity in [0, 1]
    pub similarity: f64,
    pub nli_label: NliLabel,
    pub nli_confidence: f64,
    /// Derived by [`VerdictPolicy::combine`], never set independently
    pub final_score: f64,
    pub judgment: String,
}

impl ScoredCandidate {
    /// Combine a candidate's signals under a policy.
    pub fn new(
        candidate: EvidenceCandidate,
        retrieval_rank: usize,
        similarity: f64,
        nli: NliJudgment,
        policy: &VerdictPolicy,
    ) -> Self {
        let similarity = similarity.clamp(0.0, 1.0);
        let final_score = policy.combine(similarity, nli.label);

        Self {
            candidate,
            retrieval_rank,
            similarity,
            nli_label: nli.label,
            nli_confidence: nli.confidence,
            final_score,
            judgment: policy.judgment(final_score).to_string(),
        }
    }
}

/// Sort candidates by final score, descending; ties keep retrieval order.
pub fn sort_by_final_score(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.retrieval_rank.cmp(&b.retrieval_rank))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::SummaryMethod;

    fn candidate() -> EvidenceCandidate {
        EvidenceCandidate {
            sentence: "세종대왕은 1397년에 태어났다.".to_string(),
            original_sentence: "세종대왕은 1397년에 태어났다.".to_string(),
            url: String::new(),
            matched_keywords: vec!["세종대왕".to_string()],
            match_score: 2,
            summary_method: SummaryMethod::Verbatim,
        }
    }

    #[test]
    fn test_contradiction_deduction() {
        let policy = VerdictPolicy::default();
        let final_score = policy.combine(0.9, NliLabel::Contradiction);
        assert!((final_score - 0.45).abs() < 1e-12);
        assert_eq!(policy.judgment(final_score), JUDGMENT_POSSIBLE);
    }

    #[test]
    fn test_entailment_keeps_similarity() {
        let policy = VerdictPolicy::default();
        assert_eq!(policy.combine(0.9, NliLabel::Entailment), 0.9);
        assert_eq!(policy.combine(0.9, NliLabel::Error), 0.9);
    }

    #[test]
    fn test_verdict_monotonicity() {
        let policy = VerdictPolicy::default();
        for similarity in [0.0, 0.3, 0.55, 0.9, 1.0] {
            let contradiction = policy.combine(similarity, NliLabel::Contradiction);
            let neutral = policy.combine(similarity, NliLabel::Neutral);
            let entailment = policy.combine(similarity, NliLabel::Entailment);

            assert!(contradiction <= neutral);
            assert!(neutral <= entailment);
            assert_eq!(entailment, similarity);
        }
    }

    #[test]
    fn test_final_score_never_negative() {
        let policy = VerdictPolicy {
            hallucination_threshold: 0.7,
            contradiction_penalty: 1.5,
            neutral_penalty: 0.25,
        };
        assert_eq!(policy.combine(0.8, NliLabel::Contradiction), 0.0);
    }

    #[test]
    fn test_judgment_threshold() {
        let policy = VerdictPolicy::default();
        assert_eq!(policy.judgment(0.7), JUDGMENT_LOW);
        assert_eq!(policy.judgment(0.69), JUDGMENT_POSSIBLE);
    }

    #[test]
    fn test_scored_candidate_derivation() {
        let policy = VerdictPolicy::default();
        let scored = ScoredCandidate::new(
            candidate(),
            0,
            0.9,
            NliJudgment::new(NliLabel::Contradiction, 0.95),
            &policy,
        );

        assert!((scored.final_score - 0.45).abs() < 1e-12);
        assert_eq!(scored.judgment, JUDGMENT_POSSIBLE);
        assert_eq!(scored.nli_label, NliLabel::Contradiction);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// For any similarity, contradiction never scores above
            /// neutral, neutral never above entailment, and entailment
            /// passes similarity through unchanged.
            #[test]
            fn final_score_is_monotone_in_label(similarity in 0.0f64..=1.0) {
                let policy = VerdictPolicy::default();
                let contradiction = policy.combine(similarity, NliLabel::Contradiction);
                let neutral = policy.combine(similarity, NliLabel::Neutral);
                let entailment = policy.combine(similarity, NliLabel::Entailment);

                prop_assert!(contradiction <= neutral);
                prop_assert!(neutral <= entailment);
                prop_assert_eq!(entailment, similarity);
            }

            /// Final scores stay inside [0, 1] for any policy penalties.
            #[test]
            fn final_score_is_bounded(
                similarity in 0.0f64..=1.0,
                contradiction_penalty in 0.0f64..=2.0,
                neutral_penalty in 0.0f64..=2.0,
            ) {
                let policy = VerdictPolicy {
                    hallucination_threshold: 0.7,
                    contradiction_penalty,
                    neutral_penalty,
                };
                for label in [
                    NliLabel::Entailment,
                    NliLabel::Neutral,
                    NliLabel::Contradiction,
                    NliLabel::Error,
                ] {
                    let score = policy.combine(similarity, label);
                    prop_assert!((0.0..=1.0).contains(&score));
                }
            }
        }
    }

    #[test]
    fn test_sort_stable_on_ties() {
        let policy = VerdictPolicy::default();
        let mut scored = vec![
            ScoredCandidate::new(candidate(), 0, 0.5, NliJudgment::new(NliLabel::Neutral, 0.9), &policy),
            ScoredCandidate::new(candidate(), 1, 0.9, NliJudgment::new(NliLabel::Entailment, 0.9), &policy),
            ScoredCandidate::new(candidate(), 2, 0.5, NliJudgment::new(NliLabel::Neutral, 0.8), &policy),
        ];
        sort_by_final_score(&mut scored);

        assert_eq!(scored[0].retrieval_rank, 1);
        // Equal final scores keep retrieval order.
        assert_eq!(scored[1].retrieval_rank, 0);
        assert_eq!(scored[2].retrieval_rank, 2);
    }
}
