//! Fixed sidecar descriptors accompanying each events table. These are
//! study metadata, carried verbatim; the alignment core never edits them.

use serde_json::{json, Map, Value};

/// Probe items in presentation order: (item, question wording, low anchor,
/// high anchor).
const PROBE_ITEMS: &[(&str, &str, &str, &str)] = &[
    (
        "att",
        "Were you more focused on your thoughts (mental) or sensing the world or your body (physical)?",
        "completely physical",
        "completely mental",
    ),
    (
        "past",
        "Were your thoughts oriented towards the past?",
        "not past oriented",
        "completely past oriented",
    ),
    (
        "fut",
        "Were your thoughts oriented towards the future?",
        "not future oriented",
        "completely future oriented",
    ),
    (
        "self",
        "Were your thoughts about yourself?",
        "nothing about you",
        "completely about you",
    ),
    (
        "ppl",
        "Were your thoughts about others?",
        "nothing about others",
        "completely about others",
    ),
    (
        "arou",
        "How activated or energized were you feeling?",
        "completely deactivated",
        "completely activated",
    ),
    (
        "aff",
        "How positive or negative were you feeling?",
        "completely negative",
        "completely positive",
    ),
    (
        "eng",
        "How easy was it to disengage from your thoughts?",
        "extremely easy",
        "extremely hard",
    ),
    (
        "mvmt",
        "Were your thoughts freely moving?",
        "unmoving",
        "moving freely",
    ),
    (
        "delib",
        "How intentional were your thoughts?",
        "completely unintentional",
        "completely intentional",
    ),
    (
        "img",
        "Were your thoughts visual?",
        "completely visual",
        "completely non-visual",
    ),
    (
        "ling",
        "Were your thoughts verbal?",
        "completely verbal",
        "completely non-verbal",
    ),
    (
        "conf",
        "How confident are you about your ratings for this trial?",
        "completely confident",
        "completely unconfident",
    ),
];

/// Per-item field descriptions for the probe task events sidecar.
pub fn probe_sidecar() -> Value {
    let mut fields = Map::new();
    for (item, wording, low_anchor, high_anchor) in PROBE_ITEMS {
        fields.insert(
            format!("{item}_response"),
            json!({
                "question_wording": wording,
                "low_anchor": low_anchor,
                "high_anchor": high_anchor,
            }),
        );
        fields.insert(
            format!("{item}_RT"),
            json!({ "Description": "Response time in seconds" }),
        );
        fields.insert(
            format!("{item}_onset"),
            json!({ "Description": "Onset of item wording on screen in seconds" }),
        );
        fields.insert(
            format!("{item}_offset"),
            json!({ "Description": "Offset of item wording off of screen in seconds" }),
        );
    }
    Value::Object(fields)
}

/// Field descriptions for the continuous-performance task events sidecar.
pub fn cpt_sidecar() -> Value {
    json!({
        "cue": {
            "LongName": "Cue image",
            "Description": "The type of image (city/mountain) presented to participants where cities are non-targets and mountains are targets",
            "Levels": {
                "1": "Target (mountain) nogo trial",
                "2": "Non-target (city) go trial"
            }
        },
        "onset": {
            "Description": "Onset time in seconds"
        },
        "stimulus_coherence": {
            "Description": "The coherence of the image to be judged on trial N as compared to trial N-1."
        },
        "response_time": {
            "Description": "Response time in seconds calculated as the amount of time that has elapsed from when the N-1 image was at 100% coherence to the time of the response made by the participant."
        },
        "response": {
            "LongName": "Coded response from the participant",
            "Description": "Whether a commission response was correct / incorrect or whether a response was omitted.",
            "Levels": {
                "1": "Correct commission response",
                "0": "No response",
                "-1": "Incorrect commission response"
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_sidecar_covers_every_item_metric() {
        let sidecar = probe_sidecar();
        let fields = sidecar.as_object().expect("object");
        assert_eq!(fields.len(), PROBE_ITEMS.len() * 4);
        assert!(fields.contains_key("att_response"));
        assert!(fields.contains_key("conf_offset"));
    }

    #[test]
    fn cpt_sidecar_documents_response_levels() {
        let sidecar = cpt_sidecar();
        assert!(sidecar["response"]["Levels"]["-1"].is_string());
    }
}
