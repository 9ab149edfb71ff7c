//! Prompt assembly.
//!
//! The system instruction is built from four fixed blocks in order:
//! persona and behavioural rules, the emotion-tag protocol (when enabled),
//! the sensor instruction, and a closing reminder. The user text is passed
//! through untouched.

use cartmanify_core::{Emotion, Message, SensorLevel};

use crate::sensor::instruction_for;

const PERSONA: &str = "You are Eric Cartman from South Park. You're having a conversation with someone. Respond to their message in your typical style:
- Be sarcastic, self-centered, egotistical, and manipulative
- React dramatically to everything - you're either the victim or the hero, never in between
- Use your catchphrases when appropriate (e.g., \"Screw you guys\", \"Respect my authoritah!\", \"But meeeeem!\", \"I'm not fat, I'm big-boned!\")
- Show your obsessions: KFC, being in charge, getting what you want, scheming
- Be dismissive of others' feelings while being overly sensitive about your own
- Sometimes go on tangents about your elaborate plans or conspiracy theories";

const EMOTION_PROTOCOL_HEADER: &str = "Start every reply with exactly one emotion tag in square brackets, followed by a space and then your reply. Use one of these tags, written exactly as shown:";

const CLOSING: &str = "Remember: You're responding in a conversation, not just transforming text. React to what they're saying as Cartman would.";

fn emotion_guidance(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Neutral => "your default scheming, matter-of-fact mood",
        Emotion::Laughing => "you find something hilarious or you're gloating",
        Emotion::Surprised => "something shocks you or catches you off guard",
        Emotion::Angry => "you're furious, offended, or not getting your way",
        Emotion::Sad => "you're whining, sulking, or playing the victim",
    }
}

/// The instruction/user-text pair sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system_instruction: String,
    pub user_text: String,
}

impl ComposedPrompt {
    /// The two-message exchange: instruction first, then the user text.
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(&self.system_instruction),
            Message::user(&self.user_text),
        ]
    }
}

/// Builds prompts for the fixed persona.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    emotion_tags: bool,
}

impl PromptComposer {
    pub fn new(emotion_tags: bool) -> Self {
        Self { emotion_tags }
    }

    pub fn emotion_tags(&self) -> bool {
        self.emotion_tags
    }

    pub fn compose(&self, text: &str, level: SensorLevel) -> ComposedPrompt {
        let mut instruction = String::from(PERSONA);

        if self.emotion_tags {
            instruction.push_str("\n\n");
            instruction.push_str(EMOTION_PROTOCOL_HEADER);
            for emotion in Emotion::ALL {
                instruction.push_str(&format!(
                    "\n- [{}] when {}",
                    emotion.as_str(),
                    emotion_guidance(emotion)
                ));
            }
        }

        instruction.push_str("\n\nLanguage rule: ");
        instruction.push_str(instruction_for(level));
        instruction.push_str("\n\n");
        instruction.push_str(CLOSING);

        ComposedPrompt {
            system_instruction: instruction,
            user_text: text.to_string(),
        }
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(true)
    }
}
