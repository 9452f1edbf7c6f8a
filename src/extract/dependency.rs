//! Dependency-parse SVO strategy.
//!
//! Works over word-level dependency annotations. Two relation inventories
//! are understood: the universal-style labels a dependency parser emits
//! for English (nsubj, dobj, ROOT, ...) and the phrase labels a Korean
//! analyzer emits (NP_SBJ, NP_OBJ, VP).

use super::annotator::{Annotation, Token};
use super::types::{ExtractionMethod, Language, PredicateType, SvoResult};

const SUBJECT_DEPS: &[&str] = &["nsubj", "nsubjpass"];
const OBJECT_DEPS: &[&str] = &["dobj", "pobj", "attr", "oprd"];

/// Extract an SVO triple from dependency arcs. Returns `None` only when
/// the annotation carries no tokens at all.
pub(crate) fn extract_svo(annotation: &Annotation, language: Language) -> Option<SvoResult> {
    if annotation.tokens.is_empty() {
        return None;
    }

    match language {
        Language::English => Some(extract_universal(&annotation.tokens, language)),
        Language::Korean => Some(extract_phrase_labels(&annotation.tokens, language)),
    }
}

fn extract_universal(tokens: &[Token], language: Language) -> SvoResult {
    let mut subjects: Vec<&str> = Vec::new();
    let mut verbs: Vec<String> = Vec::new();
    let mut objects: Vec<&str> = Vec::new();

    for token in tokens {
        if SUBJECT_DEPS.contains(&token.dep.as_str()) {
            subjects.push(&token.text);
        }
        if token.dep == "ROOT" {
            if token.pos == "VERB" {
                verbs.push(token.text.clone());
            } else {
                // Non-verbal root: fall back to the lemma of an
                // auxiliary or copula token.
                if let Some(aux) = tokens.iter().find(|t| matches!(t.pos.as_str(), "AUX" | "VERB")) {
                    verbs.push(aux.lemma.clone());
                }
            }
        }
        if OBJECT_DEPS.contains(&token.dep.as_str()) {
            objects.push(&token.text);
        }
        // Coordinated conjuncts inherit the role of their head.
        if token.dep == "conj" {
            if let Some(head) = tokens.get(token.head) {
                if SUBJECT_DEPS.contains(&head.dep.as_str()) {
                    subjects.push(&token.text);
                } else if OBJECT_DEPS.contains(&head.dep.as_str()) {
                    objects.push(&token.text);
                } else if head.dep == "ROOT" && token.pos == "VERB" {
                    verbs.push(token.text.clone());
                }
            }
        }
    }

    SvoResult::new(
        subjects.first().copied().unwrap_or_default(),
        verbs.into_iter().next().unwrap_or_default(),
        objects.first().map(|o| o.to_string()),
        PredicateType::Verb,
        ExtractionMethod::DependencyParse,
        language,
    )
}

fn extract_phrase_labels(tokens: &[Token], language: Language) -> SvoResult {
    let subject = tokens.iter().find(|t| t.dep == "NP_SBJ").map(|t| t.text.clone());
    let object = tokens.iter().find(|t| t.dep == "NP_OBJ").map(|t| t.text.clone());
    let verb = tokens.iter().find(|t| t.dep == "VP").map(|t| t.text.clone());

    SvoResult::new(
        subject.unwrap_or_default(),
        verb.unwrap_or_default(),
        object,
        PredicateType::Verb,
        ExtractionMethod::DependencyParse,
        language,
    )
}
