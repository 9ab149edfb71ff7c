//! Emotion-tag extraction from raw completion text.

use cartmanify_core::Emotion;

/// The cleaned reply body and its resolved emotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub cleaned_text: String,
    pub emotion: Emotion,
}

/// Extract a leading `[emotion]` tag.
///
/// The tag must be the literal prefix of `raw` and its name must match an
/// [`Emotion`] name exactly (case-sensitive). Anything else leaves the text
/// unchanged and resolves to [`Emotion::Neutral`]. Never fails.
pub fn parse(raw: &str) -> ParsedResponse {
    match split_tag(raw) {
        Some((emotion, rest)) => ParsedResponse {
            cleaned_text: rest.trim().to_string(),
            emotion,
        },
        None => ParsedResponse {
            cleaned_text: raw.to_string(),
            emotion: Emotion::Neutral,
        },
    }
}

fn split_tag(raw: &str) -> Option<(Emotion, &str)> {
    let inner = raw.strip_prefix('[')?;
    let close = inner.find(']')?;
    let emotion = Emotion::from_tag(&inner[..close])?;
    Some((emotion, &inner[close + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_tag_is_extracted() {
        let parsed = parse("[angry] Screw you guys!");
        assert_eq!(parsed.cleaned_text, "Screw you guys!");
        assert_eq!(parsed.emotion, Emotion::Angry);
    }

    #[test]
    fn untagged_text_is_neutral() {
        let parsed = parse("Screw you guys!");
        assert_eq!(parsed.cleaned_text, "Screw you guys!");
        assert_eq!(parsed.emotion, Emotion::Neutral);
    }

    #[test]
    fn wrong_case_is_not_a_tag() {
        let parsed = parse("[ANGRY] Screw you guys!");
        assert_eq!(parsed.cleaned_text, "[ANGRY] Screw you guys!");
        assert_eq!(parsed.emotion, Emotion::Neutral);
    }

    #[test]
    fn every_emotion_is_recognised() {
        for emotion in Emotion::ALL {
            let parsed = parse(&format!("[{}] ok", emotion.as_str()));
            assert_eq!(parsed.emotion, emotion);
            assert_eq!(parsed.cleaned_text, "ok");
        }
    }

    #[test]
    fn tag_without_following_space() {
        let parsed = parse("[laughing]Ha ha, you guys suck!");
        assert_eq!(parsed.emotion, Emotion::Laughing);
        assert_eq!(parsed.cleaned_text, "Ha ha, you guys suck!");
    }

    #[test]
    fn whitespace_after_tag_and_trailing_is_trimmed() {
        let parsed = parse("[sad]\n\n  Nobody respects me.  \n");
        assert_eq!(parsed.emotion, Emotion::Sad);
        assert_eq!(parsed.cleaned_text, "Nobody respects me.");
    }

    #[test]
    fn malformed_tags_degrade_to_neutral() {
        for raw in [
            " [angry] leading space",
            "[angry! ] extra characters",
            "[bored] unknown tag",
            "Well [angry] not at start",
            "[angry unterminated",
            "[] empty",
        ] {
            let parsed = parse(raw);
            assert_eq!(parsed.emotion, Emotion::Neutral, "input: {raw:?}");
            assert_eq!(parsed.cleaned_text, raw);
        }
    }

    #[test]
    fn empty_input() {
        let parsed = parse("");
        assert_eq!(parsed.cleaned_text, "");
        assert_eq!(parsed.emotion, Emotion::Neutral);
    }

    #[test]
    fn tag_only() {
        let parsed = parse("[surprised]");
        assert_eq!(parsed.emotion, Emotion::Surprised);
        assert_eq!(parsed.cleaned_text, "");
    }
}
