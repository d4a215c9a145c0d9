// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # newdle Core
//!
//! Domain models shared by all newdle client crates.
//!
//! ## Key Types
//!
//! ### Users
//! - [`User`] - The authenticated user profile
//! - [`UserSearchResult`] - Signed search hits used to invite participants
//!
//! ### Newdles
//! - [`Newdle`] - A scheduling poll with its candidate timeslots
//! - [`NewNewdle`] - Payload for creating a poll
//! - [`NewdleUpdate`] - Partial update (final date)
//!
//! ### Participants
//! - [`Participant`] - One invitee and their answers
//! - [`Availability`] - Answer for a single slot
//! - [`ParticipantUpdate`] - Answers submitted by a participant

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    // Users
    User,
    UserSearch,
    UserSearchResult,
    // Newdles
    FooterLink,
    NewNewdle,
    Newdle,
    NewdleUpdate,
    // Participants
    Availability,
    BusySlot,
    NewParticipant,
    Participant,
    ParticipantUpdate,
    // Time handling
    slot_time,
};
