//! Semantic-role-labeling SVO strategy.
//!
//! Maps predicate-argument roles to grammatical slots: ARG0 is the
//! subject, ARG1/ARG2 the object, the frame predicate the verb. When the
//! annotation service returns no frames, the strategy falls back to
//! morphological analysis, then to dependency phrase labels. Each attempt
//! is independent and side-effect-free.

use tracing::debug;

use super::annotator::Annotation;
use super::types::{ExtractionMethod, Language, PredicateType, SvoResult};
use super::{dependency, morphology};

/// Extract an SVO triple from SRL frames alone. Returns `None` when the
/// annotation carries no frames.
pub(crate) fn extract_from_frames(annotation: &Annotation, language: Language) -> Option<SvoResult> {
    let frame = annotation.frames.iter().find(|f| !f.arguments.is_empty())?;

    let subject = frame
        .arguments
        .iter()
        .find(|a| a.role == "ARG0")
        .map(|a| a.text.clone());
    let object = frame
        .arguments
        .iter()
        .find(|a| a.role == "ARG1" || a.role == "ARG2")
        .map(|a| a.text.clone());

    // The frame names the predicate; the morpheme tags say what kind of
    // predicate it is.
    let predicate_type = annotation
        .morphemes
        .iter()
        .find_map(|m| PredicateType::from_tag(&m.tag))
        .unwrap_or(PredicateType::Verb);

    Some(SvoResult::new(
        subject.unwrap_or_default(),
        frame.predicate.clone(),
        object,
        predicate_type,
        ExtractionMethod::SemanticRoles,
        language,
    ))
}

/// SRL extraction with its full fallback chain:
/// frames → morphological analysis → dependency phrase labels.
/// Returns `None` only when the annotation is entirely empty.
pub(crate) fn extract_with_fallback(
    annotation: &Annotation,
    language: Language,
) -> Option<SvoResult> {
    if let Some(svo) = extract_from_frames(annotation, language) {
        return Some(svo);
    }

    debug!("no SRL frames, falling back to morphological analysis");
    if let Some(svo) = morphology::extract_svo(&annotation.morphemes, language).into_iter().next() {
        return Some(svo);
    }

    debug!("no morphemes, falling back to dependency labels");
    dependency::extract_svo(annotation, language)
}
