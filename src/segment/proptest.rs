//! Property-based tests for segmentation and validation.
//!
//! These tests verify the structural invariants of the splitter and the
//! validator:
//!
//! - Re-splitting already-split sentences reproduces the same sequence
//! - Valid and invalid counts always sum to the total
//! - Deduplication is idempotent

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::segment::splitter::split_sentences;
    use crate::segment::validator::SentenceValidator;

    // Strategy for claim-like text mixing Hangul clauses, Latin words,
    // digits, and terminators.
    fn claim_text() -> impl Strategy<Value = String> {
        let clause = prop_oneof![
            Just("세종대왕은 1397년에 태어났다".to_string()),
            Just("윤동주는 시인이었다".to_string()),
            Just("King Sejong created Hangul".to_string()),
            Just("안녕하세요".to_string()),
            Just("12345".to_string()),
            Just("날씨가 좋다".to_string()),
        ];
        let terminator = prop_oneof![
            Just(".".to_string()),
            Just("!".to_string()),
            Just("?".to_string()),
            Just(". ".to_string()),
        ];

        prop::collection::vec((clause, terminator), 0..6).prop_map(|parts| {
            parts
                .into_iter()
                .map(|(clause, terminator)| format!("{}{}", clause, terminator))
                .collect::<String>()
        })
    }

    proptest! {
        /// Splitting is idempotent: rejoining split sentences (each keeps
        /// its terminator) and splitting again yields the same sequence.
        #[test]
        fn split_is_idempotent(text in claim_text()) {
            let first = split_sentences(&text);
            let rejoined = first.join("");
            let second = split_sentences(&rejoined);
            prop_assert_eq!(first, second);
        }

        /// Split sentences are never empty or whitespace-padded.
        #[test]
        fn split_sentences_are_trimmed(text in claim_text()) {
            for sentence in split_sentences(&text) {
                prop_assert!(!sentence.trim().is_empty());
                prop_assert_eq!(sentence.trim(), sentence.as_str());
            }
        }

        /// valid + invalid == total, and the rate follows from the counts.
        #[test]
        fn validation_counts_are_consistent(text in claim_text()) {
            let validator = SentenceValidator::new();
            let result = validator.validate_text(&text);
            let summary = &result.summary;

            prop_assert_eq!(summary.valid + summary.invalid, summary.total);
            prop_assert_eq!(result.valid_sentences.len(), summary.valid);
            prop_assert_eq!(result.invalid_sentences.len(), summary.invalid);

            let expected_rate = if summary.total > 0 {
                summary.valid as f64 / summary.total as f64 * 100.0
            } else {
                0.0
            };
            prop_assert!((summary.valid_rate - expected_rate).abs() < 1e-9);
        }

        /// Deduplication is idempotent and never grows the input.
        #[test]
        fn dedup_is_idempotent(text in claim_text()) {
            let validator = SentenceValidator::new();
            let sentences = split_sentences(&text);

            let once = validator.remove_duplicates(&sentences);
            let twice = validator.remove_duplicates(&once);

            prop_assert!(once.len() <= sentences.len());
            prop_assert_eq!(once, twice);
        }
    }
}
