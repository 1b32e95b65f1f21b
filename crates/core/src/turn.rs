//! Turn, stance, and strategy domain types.
//!
//! These are the core value objects of the orchestrator: a user
//! utterance is classified into a `Stance`, a `Strategy` is selected by
//! the policy, and the completed exchange is persisted as a pair of
//! `Turn` records sharing both labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ClassificationError;

/// The classified motivational orientation of a user utterance.
///
/// A closed enumeration: classifier output that parses to none of the
/// three labels is an error, never a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    /// No clear lean toward or away from change.
    Neutral,
    /// Change talk — the client voices motivation to change.
    Change,
    /// Sustain talk — the client defends the status quo.
    Sustain,
}

impl Stance {
    pub const ALL: [Stance; 3] = [Stance::Neutral, Stance::Change, Stance::Sustain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Neutral => "neutral",
            Stance::Change => "change",
            Stance::Sustain => "sustain",
        }
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stance {
    type Err = ClassificationError;

    /// Strict parse: surrounding whitespace is tolerated, anything else
    /// outside the enumeration is rejected.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "neutral" => Ok(Stance::Neutral),
            "change" => Ok(Stance::Change),
            "sustain" => Ok(Stance::Sustain),
            other => Err(ClassificationError::InvalidLabel(other.to_string())),
        }
    }
}

/// The counseling dialogue-act chosen for an exchange.
///
/// Eleven codes, split into reflections (restating or reinterpreting
/// the client's own words) and non-reflections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// AF — affirm
    #[serde(rename = "AF")]
    Affirm,
    /// EC — emphasize control
    #[serde(rename = "EC")]
    EmphasizeControl,
    /// GI — give information
    #[serde(rename = "GI")]
    GiveInformation,
    /// QU — question
    #[serde(rename = "QU")]
    Question,
    /// RF — reframe
    #[serde(rename = "RF")]
    Reframe,
    /// ST — structure
    #[serde(rename = "ST")]
    Structure,
    /// SiR — simple reflection
    #[serde(rename = "SiR")]
    SimpleReflection,
    /// DR — double-sided reflection
    #[serde(rename = "DR")]
    DoubleSidedReflection,
    /// MR — metaphorical reflection
    #[serde(rename = "MR")]
    MetaphoricalReflection,
    /// AR — amplified reflection
    #[serde(rename = "AR")]
    AmplifiedReflection,
    /// SuR — summarizing reflection
    #[serde(rename = "SuR")]
    SummarizingReflection,
}

impl Strategy {
    /// All eleven strategies.
    pub const ALL: [Strategy; 11] = [
        Strategy::Affirm,
        Strategy::EmphasizeControl,
        Strategy::GiveInformation,
        Strategy::Question,
        Strategy::Reframe,
        Strategy::Structure,
        Strategy::SimpleReflection,
        Strategy::DoubleSidedReflection,
        Strategy::MetaphoricalReflection,
        Strategy::AmplifiedReflection,
        Strategy::SummarizingReflection,
    ];

    /// The reflection branch, in policy draw order.
    pub const REFLECTIONS: [Strategy; 5] = [
        Strategy::SimpleReflection,
        Strategy::DoubleSidedReflection,
        Strategy::MetaphoricalReflection,
        Strategy::AmplifiedReflection,
        Strategy::SummarizingReflection,
    ];

    /// The non-reflection branch, in policy draw order.
    pub const NON_REFLECTIONS: [Strategy; 6] = [
        Strategy::Affirm,
        Strategy::EmphasizeControl,
        Strategy::GiveInformation,
        Strategy::Question,
        Strategy::Reframe,
        Strategy::Structure,
    ];

    /// The short MI dialogue-act code (e.g. "SiR").
    pub fn code(&self) -> &'static str {
        match self {
            Strategy::Affirm => "AF",
            Strategy::EmphasizeControl => "EC",
            Strategy::GiveInformation => "GI",
            Strategy::Question => "QU",
            Strategy::Reframe => "RF",
            Strategy::Structure => "ST",
            Strategy::SimpleReflection => "SiR",
            Strategy::DoubleSidedReflection => "DR",
            Strategy::MetaphoricalReflection => "MR",
            Strategy::AmplifiedReflection => "AR",
            Strategy::SummarizingReflection => "SuR",
        }
    }

    /// Whether this strategy is a reflection.
    pub fn is_reflection(&self) -> bool {
        Strategy::REFLECTIONS.contains(self)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Strategy::ALL
            .iter()
            .find(|st| st.code() == s.trim())
            .copied()
            .ok_or_else(|| format!("unknown strategy code: {s:?}"))
    }
}

/// Who authored a persisted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    System,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::System => "system",
        }
    }
}

impl FromStr for Speaker {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(Speaker::User),
            "system" => Ok(Speaker::System),
            other => Err(format!("unknown speaker: {other:?}")),
        }
    }
}

/// One persisted message within an exchange.
///
/// A single request always produces exactly two turns — user-authored
/// and system-authored — sharing the same `stance` and `strategy`.
/// `counterpart` holds the paired message from the other speaker for
/// audit symmetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Conversation identity this turn belongs to.
    pub identity: String,

    /// Who authored the `text`.
    pub speaker: Speaker,

    /// The literal utterance or reply.
    pub text: String,

    /// Stance classified once per exchange, copied onto both records.
    pub stance: Stance,

    /// Strategy selected once per exchange, copied onto both records.
    pub strategy: Strategy,

    /// The paired message from the other speaker in the same exchange.
    pub counterpart: String,

    /// Creation timestamp, used to order history on reload.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Build the user-authored and system-authored records for one
    /// completed exchange. Both share stance, strategy, and timestamp.
    pub fn exchange(
        identity: impl Into<String>,
        user_text: impl Into<String>,
        system_text: impl Into<String>,
        stance: Stance,
        strategy: Strategy,
    ) -> (Turn, Turn) {
        let identity = identity.into();
        let user_text = user_text.into();
        let system_text = system_text.into();
        let now = Utc::now();

        let user_turn = Turn {
            identity: identity.clone(),
            speaker: Speaker::User,
            text: user_text.clone(),
            stance,
            strategy,
            counterpart: system_text.clone(),
            created_at: now,
        };
        let system_turn = Turn {
            identity,
            speaker: Speaker::System,
            text: system_text,
            stance,
            strategy,
            counterpart: user_text,
            created_at: now,
        };
        (user_turn, system_turn)
    }
}

/// An ordered, read-only snapshot of recent turns, oldest first.
///
/// Rebuilt from the turn store per request; the store may return turns
/// newest-first, but a history is always chronological.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    /// Wrap turns already in chronological (oldest-first) order.
    pub fn from_chronological(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Wrap turns in store order (newest-first), restoring chronology.
    pub fn from_newest_first(mut turns: Vec<Turn>) -> Self {
        turns.reverse();
        Self { turns }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
