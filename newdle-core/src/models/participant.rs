//! Participant types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::user::UserSearchResult;

/// Answer for a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Available.
    Available,
    /// Available if there is no better option.
    Ifneedbe,
    /// Not available.
    Unavailable,
}

impl Availability {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Ifneedbe => "If need be",
            Self::Unavailable => "Unavailable",
        }
    }
}

/// A participant of a newdle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Database id.
    #[serde(default)]
    pub id: Option<u64>,
    /// Display name.
    pub name: String,
    /// Email (restricted views omit it).
    #[serde(default)]
    pub email: Option<String>,
    /// Identity-provider uid for known users.
    #[serde(default)]
    pub auth_uid: Option<String>,
    /// Secret participant code used for anonymous answering.
    #[serde(default)]
    pub code: Option<String>,
    /// Answers keyed by slot (`YYYY-MM-DDTHH:MM`).
    #[serde(default)]
    pub answers: BTreeMap<String, Availability>,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Participant {
    /// Returns true if the participant answered at least one slot.
    pub fn has_answered(&self) -> bool {
        !self.answers.is_empty()
    }

    /// Returns the answer for a slot, if any.
    pub fn answer_for(&self, slot: &str) -> Option<Availability> {
        self.answers.get(slot).copied()
    }
}

/// Participant invited at creation time.
///
/// Known users carry the signed identity from a user search; unknown
/// participants only have a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    /// Display name.
    pub name: String,
    /// Email of a known user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Identity uid of a known user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_uid: Option<String>,
    /// Server signature from the user search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl NewParticipant {
    /// Creates an unknown participant with only a name.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            auth_uid: None,
            signature: None,
        }
    }
}

impl From<UserSearchResult> for NewParticipant {
    fn from(user: UserSearchResult) -> Self {
        Self {
            name: user.name,
            email: Some(user.email),
            auth_uid: Some(user.uid),
            signature: user.signature,
        }
    }
}

/// Payload for `PATCH /api/newdle/<code>/participants/<participant_code>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantUpdate {
    /// Answers keyed by slot.
    pub answers: BTreeMap<String, Availability>,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
}

/// A busy interval `[start, end]` (`HH:MM`) returned by the free/busy lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusySlot(pub String, pub String);
