//! The fixed question sequence.
//!
//! Four yes/no questions, always asked in the same order:
//! zen → trade_republic → bitsa → bbva.

use serde::{Deserialize, Serialize};

/// Identifies one question in the fixed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKey {
    Zen,
    TradeRepublic,
    Bitsa,
    Bbva,
}

impl QuestionKey {
    /// The first question of every dialog.
    pub fn first() -> QuestionKey {
        QuestionKey::Zen
    }

    /// Get the next question in the linear progression, if any.
    pub fn next(&self) -> Option<QuestionKey> {
        use QuestionKey::*;
        match self {
            Zen => Some(TradeRepublic),
            TradeRepublic => Some(Bitsa),
            Bitsa => Some(Bbva),
            Bbva => None,
        }
    }

    /// Whether this is the final question of the sequence.
    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// The static spec for this question.
    pub fn spec(&self) -> &'static QuestionSpec {
        &QUESTIONS[*self as usize]
    }
}

impl std::fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Zen => "zen",
            Self::TradeRepublic => "trade_republic",
            Self::Bitsa => "bitsa",
            Self::Bbva => "bbva",
        };
        write!(f, "{s}")
    }
}

/// Static definition of one question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionSpec {
    pub key: QuestionKey,
    /// Prompt text shown to the user.
    pub prompt: &'static str,
    /// Short label used in the summary listing.
    pub label: &'static str,
}

/// The full question table, in ask order.
pub static QUESTIONS: [QuestionSpec; 4] = [
    QuestionSpec {
        key: QuestionKey::Zen,
        prompt: "Avete mai registrato un ZEN?",
        label: "ZEN",
    },
    QuestionSpec {
        key: QuestionKey::TradeRepublic,
        prompt: "Avete mai registrato un Trade Republic?",
        label: "Trade Republic",
    },
    QuestionSpec {
        key: QuestionKey::Bitsa,
        prompt: "Avete mai registrato un Bitsa?",
        label: "Bitsa",
    },
    QuestionSpec {
        key: QuestionKey::Bbva,
        prompt: "Avete mai registrato un BBVA?",
        label: "BBVA",
    },
];
