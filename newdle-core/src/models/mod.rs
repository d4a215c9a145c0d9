//! Domain models for newdle.
//!
//! These mirror the JSON documents exchanged with the newdle API.
//!
//! ## Submodules
//!
//! - [`user`] - User profile and search results
//! - [`newdle`] - Polls, creation and update payloads
//! - [`participant`] - Participants, answers, busy times
//! - [`slot_time`] - Serde helpers for the API's minute-precision timestamps

mod newdle;
mod participant;
pub mod slot_time;
mod user;

pub use newdle::{FooterLink, NewNewdle, Newdle, NewdleUpdate};
pub use participant::{Availability, BusySlot, NewParticipant, Participant, ParticipantUpdate};
pub use user::{User, UserSearch, UserSearchResult};
