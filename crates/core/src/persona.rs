//! Persona — the configurable system-prompt template.
//!
//! One persona definition with enumerated options replaces hand-edited
//! prompt prose duplicated per deployment. `render()` is deterministic:
//! the same persona always produces byte-identical prompt text, so the
//! assembled request for a fixed input set never drifts between runs.

use serde::{Deserialize, Serialize};

/// Conversational tone options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Warm and encouraging (default — matches the course-guide register)
    #[default]
    Friendly,
    /// Neutral and businesslike
    Formal,
    /// High-energy, coach-style
    Motivational,
}

/// How far beyond the bundled course material the bot may advise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceScope {
    /// Only answer from the provided course material
    #[default]
    CourseOnly,
    /// General advice is allowed when course material doesn't cover it
    General,
}

/// The chatbot's persona configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// The bot's name
    pub name: String,

    /// One-line description of what the bot does
    pub description: String,

    /// Conversational tone
    #[serde(default)]
    pub tone: Tone,

    /// Whether advice may go beyond the course material
    #[serde(default)]
    pub advice_scope: AdviceScope,

    /// Whether replies must name the course document they draw from
    #[serde(default)]
    pub require_citations: bool,

    /// Extra behavioral guidelines, one per line in the rendered prompt
    #[serde(default)]
    pub guidelines: Vec<String>,
}

impl Persona {
    /// The built-in course-guide persona used when none is configured.
    pub fn default_persona() -> Self {
        Self {
            name: "StudyLab".into(),
            description: "a course guide that walks students through their \
                          enrolled courses in the official module order"
                .into(),
            tone: Tone::Friendly,
            advice_scope: AdviceScope::CourseOnly,
            require_citations: false,
            guidelines: vec![
                "Always follow the official module order from the course order list".into(),
                "When asked for study plans (like 30-day breakdowns), split modules evenly \
                 across the days"
                    .into(),
                "Keep answers structured: short paragraphs or numbered steps".into(),
            ],
        }
    }

    /// Render the persona as system-prompt text.
    ///
    /// Deterministic: option order is fixed and no timestamps or random
    /// values are embedded.
    pub fn render(&self) -> String {
        let mut out = format!("You are {}, {}.\n", self.name, self.description);

        out.push_str(match self.tone {
            Tone::Friendly => "Be friendly and encouraging.\n",
            Tone::Formal => "Keep a neutral, professional register.\n",
            Tone::Motivational => "Be energetic and motivational; celebrate progress.\n",
        });

        out.push_str(match self.advice_scope {
            AdviceScope::CourseOnly => {
                "Answer only from the provided course material. If a question falls \
                 outside it, say so and steer back to the courses.\n"
            }
            AdviceScope::General => {
                "Prefer the provided course material; general advice is allowed when \
                 the material does not cover the question.\n"
            }
        });

        if self.require_citations {
            out.push_str("Name the course document each answer draws from.\n");
        }

        for guideline in &self.guidelines {
            out.push_str("- ");
            out.push_str(guideline);
            out.push('\n');
        }

        out
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::default_persona()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_persona_renders_guidelines() {
        let prompt = Persona::default_persona().render();
        assert!(prompt.starts_with("You are StudyLab"));
        assert!(prompt.contains("official module order"));
        assert!(prompt.contains("- When asked for study plans"));
    }

    #[test]
    fn render_is_deterministic() {
        let persona = Persona::default_persona();
        assert_eq!(persona.render(), persona.render());
    }

    #[test]
    fn citation_line_is_optional() {
        let mut persona = Persona::default_persona();
        assert!(!persona.render().contains("Name the course document"));
        persona.require_citations = true;
        assert!(persona.render().contains("Name the course document"));
    }

    #[test]
    fn tone_changes_register() {
        let mut persona = Persona::default_persona();
        persona.tone = Tone::Formal;
        let formal = persona.render();
        assert!(formal.contains("professional register"));
        assert!(!formal.contains("friendly"));
    }

    #[test]
    fn scope_options_serialize_snake_case() {
        let json = serde_json::to_string(&AdviceScope::CourseOnly).unwrap();
        assert_eq!(json, "\"course_only\"");
    }
}
