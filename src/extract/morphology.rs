//! Morphological-analysis SVO strategy.
//!
//! Groups morphemes into words by attaching particle and ending morphemes
//! to the preceding content morpheme, then reads grammatical roles off the
//! case particles: a noun followed by a subject particle is the subject, a
//! noun followed by an object particle is the object, and any
//! verb/adjective/copula morpheme is a predicate candidate.

use super::annotator::Morpheme;
use super::types::{ExtractionMethod, Language, PredicateType, SvoResult};

const SUBJECT_PARTICLES: &[&str] = &["이", "가", "은", "는"];
const OBJECT_PARTICLES: &[&str] = &["을", "를"];

fn is_noun(tag: &str) -> bool {
    tag.starts_with('N')
}

fn is_subject_particle(m: &Morpheme) -> bool {
    matches!(m.tag.as_str(), "JKS" | "JX") && SUBJECT_PARTICLES.contains(&m.lemma.as_str())
}

fn is_object_particle(m: &Morpheme) -> bool {
    m.tag == "JKO" && OBJECT_PARTICLES.contains(&m.lemma.as_str())
}

/// Render a predicate lemma in citation form ("읽" → "읽다").
fn citation_form(lemma: &str) -> String {
    if lemma.ends_with('다') {
        lemma.to_string()
    } else {
        format!("{}다", lemma)
    }
}

/// Extract SVO triples from a morpheme sequence. A copula chain
/// ("X는 Y이고 Z이다") yields one triple per copula, sharing the subject.
/// Returns an empty vec only when there are no morphemes.
pub(crate) fn extract_svo(morphemes: &[Morpheme], language: Language) -> Vec<SvoResult> {
    if morphemes.is_empty() {
        return Vec::new();
    }

    let mut subject: Option<String> = None;
    let mut object: Option<String> = None;
    let mut predicates: Vec<(String, PredicateType)> = Vec::new();
    // Nouns immediately preceding a copula, for the equational case.
    let mut copula_complements: Vec<String> = Vec::new();

    for (i, m) in morphemes.iter().enumerate() {
        if is_noun(&m.tag) {
            if let Some(next) = morphemes.get(i + 1) {
                if subject.is_none() && is_subject_particle(next) {
                    subject = Some(format!("{}{}", m.lemma, next.lemma));
                    continue;
                }
                if object.is_none() && is_object_particle(next) {
                    object = Some(m.lemma.clone());
                    continue;
                }
                if next.tag == "VCP" || next.tag == "VCN" {
                    copula_complements.push(m.lemma.clone());
                }
            }
        }

        if let Some(kind) = PredicateType::from_tag(&m.tag) {
            predicates.push((citation_form(&m.lemma), kind));
        }
    }

    // Fallback subject: first noun in the sentence.
    if subject.is_none() {
        subject = morphemes.iter().find(|m| is_noun(&m.tag)).map(|m| m.lemma.clone());
    }

    // Noun-equational chain: each copula complement becomes the object of
    // its own triple, all sharing the subject.
    if copula_complements.len() >= 2 {
        let copula = predicates
            .iter()
            .find(|(_, kind)| *kind == PredicateType::Copula)
            .map(|(lemma, _)| lemma.clone())
            .unwrap_or_else(|| citation_form("이"));

        return copula_complements
            .into_iter()
            .map(|complement| {
                SvoResult::new(
                    subject.clone().unwrap_or_default(),
                    copula.clone(),
                    Some(complement),
                    PredicateType::Copula,
                    ExtractionMethod::Morphology,
                    language,
                )
            })
            .collect();
    }

    let (verb, predicate_type) = predicates
        .into_iter()
        .next()
        .unwrap_or((String::new(), PredicateType::Verb));

    vec![SvoResult::new(
        subject.unwrap_or_default(),
        verb,
        object,
        predicate_type,
        ExtractionMethod::Morphology,
        language,
    )]
}
