//! Review tone presets: maps the caller's tone choice to a critique instruction.
//!
//! The set is closed. Anything the caller sends that is not one of the four
//! names (including nothing at all) resolves to `Friendly`; a bad tone is
//! never a request error.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReviewTone {
    #[default]
    Friendly,
    Roast,
    Advice,
    Formal,
}

impl ReviewTone {
    pub const ALL: [ReviewTone; 4] = [
        ReviewTone::Friendly,
        ReviewTone::Roast,
        ReviewTone::Advice,
        ReviewTone::Formal,
    ];

    /// Resolves raw caller input. Case and surrounding whitespace are ignored.
    pub fn from_input(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return ReviewTone::default();
        };
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(wanted))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewTone::Friendly => "friendly",
            ReviewTone::Roast => "roast",
            ReviewTone::Advice => "advice",
            ReviewTone::Formal => "formal",
        }
    }

    /// The critique-style instruction placed in front of the résumé text.
    pub fn instruction(&self) -> &'static str {
        match self {
            ReviewTone::Friendly => {
                "Review the following resume in a warm, friendly and encouraging tone. \
                 Start with what the candidate does well, then suggest a few gentle, \
                 specific improvements."
            }
            ReviewTone::Roast => {
                "Roast the following resume. Be brutally honest, sarcastic and funny, \
                 calling out every cliche, vague claim, buzzword and missed opportunity. \
                 Keep it playful rather than cruel."
            }
            ReviewTone::Advice => {
                "Give practical career advice based on the following resume. List concrete, \
                 actionable steps the candidate can take to make it stronger for the roles \
                 it targets."
            }
            ReviewTone::Formal => {
                "Write a formal, professional evaluation of the following resume as a senior \
                 hiring manager would. Assess structure, content, measurable impact and \
                 presentation, and conclude with an overall assessment."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tones_parse() {
        assert_eq!(ReviewTone::from_input(Some("roast")), ReviewTone::Roast);
        assert_eq!(ReviewTone::from_input(Some("advice")), ReviewTone::Advice);
        assert_eq!(ReviewTone::from_input(Some("formal")), ReviewTone::Formal);
        assert_eq!(ReviewTone::from_input(Some("friendly")), ReviewTone::Friendly);
    }

    #[test]
    fn test_parse_ignores_case_and_whitespace() {
        assert_eq!(ReviewTone::from_input(Some("  ROAST \n")), ReviewTone::Roast);
    }

    #[test]
    fn test_unknown_or_missing_defaults_to_friendly() {
        assert_eq!(ReviewTone::from_input(None), ReviewTone::Friendly);
        assert_eq!(ReviewTone::from_input(Some("")), ReviewTone::Friendly);
        assert_eq!(ReviewTone::from_input(Some("unknown")), ReviewTone::Friendly);
        assert_eq!(ReviewTone::from_input(Some("roasted")), ReviewTone::Friendly);
    }

    #[test]
    fn test_round_trip_through_name() {
        for tone in ReviewTone::ALL {
            assert_eq!(ReviewTone::from_input(Some(tone.as_str())), tone);
        }
    }

    #[test]
    fn test_instructions_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for tone in ReviewTone::ALL {
            assert!(seen.insert(tone.instruction()), "{tone:?} duplicates another tone");
        }
    }
}
