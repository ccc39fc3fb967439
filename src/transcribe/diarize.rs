//! Heuristic speaker attribution
//!
//! Pure lexical classification of a transcribed segment into
//! provider/patient/unknown, given the segments merged before it. No audio
//! features are consulted; this is a text-only heuristic and callers should
//! expect `Unknown` for ambiguous utterances.

use crate::session::{Speaker, TranscriptSegment};

/// Phrases characteristic of the clinician side of an encounter
const PROVIDER_CUES: &[&str] = &[
    "any allergies",
    "any medications",
    "blood pressure",
    "take a deep breath",
    "i'm going to prescribe",
    "i'm going to order",
    "i'd like to order",
    "let's take a look",
    "let's schedule",
    "on a scale of",
    "how long have you",
    "when did this start",
    "any family history",
    "follow up",
    "we'll start you on",
    "your labs",
    "the exam shows",
    "i recommend",
];

/// Phrases characteristic of the patient side
const PATIENT_CUES: &[&str] = &[
    "i feel",
    "i've been feeling",
    "i've been having",
    "it hurts",
    "the pain",
    "my chest",
    "my head",
    "my stomach",
    "my back",
    "i can't sleep",
    "it started",
    "i noticed",
    "i took",
    "i haven't been",
    "it gets worse",
];

/// Assign a speaker label to a segment, considering the segment text and
/// the preceding transcript.
pub fn identify_speaker(text: &str, prior: &[TranscriptSegment]) -> Speaker {
    let lowered = text.to_lowercase();

    let provider_score = cue_hits(&lowered, PROVIDER_CUES);
    let patient_score = cue_hits(&lowered, PATIENT_CUES);

    if provider_score > patient_score {
        return Speaker::Provider;
    }
    if patient_score > provider_score {
        return Speaker::Patient;
    }

    // Questions in a clinical encounter come mostly from the provider
    if lowered.trim_end().ends_with('?') {
        return Speaker::Provider;
    }

    // A statement right after a provider question is usually the answer
    if let Some(last) = prior.last() {
        if last.speaker == Speaker::Provider && last.text.trim_end().ends_with('?') {
            return Speaker::Patient;
        }
        if last.speaker == Speaker::Patient && last.text.trim_end().ends_with('?') {
            return Speaker::Provider;
        }
    }

    Speaker::Unknown
}

fn cue_hits(text: &str, cues: &[&str]) -> usize {
    cues.iter().filter(|cue| text.contains(*cue)).count()
}
