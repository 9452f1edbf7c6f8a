//! Sentence segmentation and quality validation.
//!
//! The splitter turns a raw answer into ordered sentences; the validator
//! filters sentences that cannot be meaningfully analyzed and produces the
//! cleaned text every later stage works with.

pub mod splitter;
pub mod validator;

#[cfg(test)]
mod proptest;

pub use splitter::{split_sentences, to_structured, SentenceRecord, StructuredAnswer};
pub use validator::{
    InvalidSentence, RejectionReason, SentenceValidator, TextValidation, ValidationOutcome,
    ValidationSummary,
};
