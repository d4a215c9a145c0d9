//! Newdle (scheduling poll) types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::participant::{NewParticipant, Participant};
use super::slot_time;
use crate::error::CoreError;

/// Minimum title length accepted by the server.
const MIN_TITLE_LEN: usize = 3;

/// Maximum title length accepted by the server.
const MAX_TITLE_LEN: usize = 80;

// ============================================================================
// Newdle
// ============================================================================

/// A scheduling poll.
///
/// Anonymous reads return a restricted view: creator email and participant
/// contact details are omitted, which is why most fields are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Newdle {
    /// Database id.
    #[serde(default)]
    pub id: Option<u64>,
    /// Public code used in URLs.
    pub code: String,
    /// Poll title.
    pub title: String,
    /// Meeting duration in minutes.
    pub duration: u32,
    /// IANA timezone of the timeslots.
    pub timezone: String,
    /// Candidate start times.
    #[serde(with = "slot_time::list")]
    pub timeslots: Vec<NaiveDateTime>,
    /// Invited participants.
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Creator display name.
    #[serde(default)]
    pub creator_name: Option<String>,
    /// Creator identifier.
    #[serde(default)]
    pub creator_uid: Option<String>,
    /// Creator email (only with full details).
    #[serde(default)]
    pub creator_email: Option<String>,
    /// Chosen final slot, once the creator picked one.
    #[serde(default, with = "slot_time::option")]
    pub final_dt: Option<NaiveDateTime>,
    /// Scheduled deletion date.
    #[serde(default, with = "slot_time::option")]
    pub deletion_dt: Option<NaiveDateTime>,
    /// Whether participants can see each other's answers.
    #[serde(default)]
    pub private: bool,
    /// Whether the creator is notified about new answers.
    #[serde(default)]
    pub notify: bool,
    /// Whether the newdle has been deleted.
    #[serde(default)]
    pub deleted: bool,
    /// Public URL of the newdle.
    #[serde(default)]
    pub url: Option<String>,
}

impl Newdle {
    /// Returns true once a final date has been chosen.
    pub fn is_finished(&self) -> bool {
        self.final_dt.is_some()
    }

    /// Returns the number of participants that answered at least one slot.
    pub fn answered_count(&self) -> usize {
        self.participants.iter().filter(|p| p.has_answered()).count()
    }
}

// ============================================================================
// Creation & Update Payloads
// ============================================================================

/// Payload for `POST /api/newdle/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNewdle {
    /// Poll title (3-80 characters).
    pub title: String,
    /// Meeting duration in minutes.
    pub duration: u32,
    /// IANA timezone of the timeslots.
    pub timezone: String,
    /// Candidate start times.
    #[serde(with = "slot_time::list")]
    pub timeslots: Vec<NaiveDateTime>,
    /// Invited participants.
    #[serde(default)]
    pub participants: Vec<NewParticipant>,
    /// Hide answers from other participants.
    pub private: bool,
    /// Notify the creator about new answers.
    pub notify: bool,
}

impl NewNewdle {
    /// Checks the constraints the server enforces, so obvious mistakes
    /// fail before a request is made.
    pub fn validate(&self) -> Result<(), CoreError> {
        let len = self.title.chars().count();
        if !(MIN_TITLE_LEN..=MAX_TITLE_LEN).contains(&len) {
            return Err(CoreError::InvalidData(format!(
                "title must be {MIN_TITLE_LEN}-{MAX_TITLE_LEN} characters, got {len}"
            )));
        }
        if self.duration == 0 {
            return Err(CoreError::InvalidData("duration must be positive".to_string()));
        }
        if self.timeslots.is_empty() {
            return Err(CoreError::InvalidData(
                "at least one timeslot is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Payload for `PATCH /api/newdle/<code>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewdleUpdate {
    /// Final slot; `None` clears a previously chosen date.
    #[serde(with = "slot_time::option")]
    pub final_dt: Option<NaiveDateTime>,
}

/// Link shown in the footer of the web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterLink {
    /// Link text.
    pub title: String,
    /// Target URL.
    pub url: String,
}
