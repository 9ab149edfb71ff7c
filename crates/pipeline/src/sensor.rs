//! Sensor level → language-register instruction.

use cartmanify_core::SensorLevel;

/// The instruction fragment that controls how profanity is rendered.
///
/// Total over [`SensorLevel`]; unrecognised levels are rejected when the
/// request is validated and never get here.
pub fn instruction_for(level: SensorLevel) -> &'static str {
    match level {
        SensorLevel::Mild => {
            "Replace all profanity with full censorship (e.g., s***, f***, etc.) or avoid profanity entirely."
        }
        SensorLevel::Medium => "Use partial masking for profanity (e.g., f**kin', b*tch, sh*t).",
        SensorLevel::Raw => "Use full uncensored profanity as Cartman would naturally speak.",
    }
}
