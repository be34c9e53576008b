use std::fmt;

use serde::{Deserialize, Serialize};

/// Exam the student is preparing for. Wire labels are the display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Exam {
    #[serde(rename = "BITSAT")]
    Bitsat,
    #[default]
    General,
    #[serde(rename = "JEE")]
    Jee,
    #[serde(rename = "NEET")]
    Neet,
    Olympiad,
}

impl Exam {
    /// Sorted by wire label, which is the order selectors show them in.
    pub const ALL: [Exam; 5] = [
        Exam::Bitsat,
        Exam::General,
        Exam::Jee,
        Exam::Neet,
        Exam::Olympiad,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Exam::Bitsat => "BITSAT",
            Exam::General => "General",
            Exam::Jee => "JEE",
            Exam::Neet => "NEET",
            Exam::Olympiad => "Olympiad",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|exam| exam.as_str() == label.trim())
    }

    /// Framing sentence handed to the tutor model for this exam.
    pub fn context(self) -> &'static str {
        match self {
            Exam::Jee => {
                "JEE Main and Advanced: emphasize conceptual depth, quick methods, and common traps."
            }
            Exam::Neet => {
                "NEET: focus on NCERT-aligned explanations, accurate fundamentals, and elimination strategies."
            }
            Exam::Bitsat => {
                "BITSAT: concise, exam-speed reasoning with formula-first problem solving."
            }
            Exam::Olympiad => {
                "Physics Olympiad: rigorous derivations, multi-step reasoning, and advanced insight."
            }
            Exam::General => {
                "General physics learning: adapt to student's level with clear stepwise guidance."
            }
        }
    }
}

impl fmt::Display for Exam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Beginner,
    #[default]
    HighSchool,
    Undergraduate,
    Olympiad,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Beginner,
        Level::HighSchool,
        Level::Undergraduate,
        Level::Olympiad,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::HighSchool => "high-school",
            Level::Undergraduate => "undergraduate",
            Level::Olympiad => "olympiad",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::HighSchool => "High school",
            Level::Undergraduate => "Undergraduate",
            Level::Olympiad => "Olympiad",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == label.trim())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
