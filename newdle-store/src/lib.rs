// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # newdle Store
//!
//! State management for the newdle client.
//!
//! This crate provides:
//!
//! - **SessionStore**: Token, login prompt, user and error list, observable
//!   through a watch channel
//! - **SettingsStore**: Client settings with persistence
//! - **Token persistence**: Restores and mirrors the session token on disk
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use newdle_store::{SessionStore, SettingsStore, load_initial_token, spawn_token_sync};
//!
//! let settings = SettingsStore::load_default().await;
//! let session = Arc::new(SessionStore::new());
//! load_initial_token(&session, &settings.token_path()).await?;
//! let sync = spawn_token_sync(Arc::clone(&session), settings.token_path());
//!
//! // Subscribe to changes
//! let mut rx = session.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("Session updated!");
//! }
//! ```

pub mod error;
pub mod error_list;
pub mod persistence;
pub mod session_store;
pub mod settings;
pub mod token;

pub use error::StoreError;
pub use error_list::{ErrorEntry, ErrorList};
pub use persistence::{
    default_config_dir, default_settings_path, default_token_path, load_json,
    load_json_or_default, save_json,
};
pub use session_store::SessionStore;
pub use settings::{LogLevel, Settings, SettingsStore};
pub use token::{load_initial_token, read_token, spawn_token_sync, write_token, TokenSync};
