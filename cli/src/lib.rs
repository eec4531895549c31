// SPDX-License-Identifier: MIT OR Apache-2.0

//! KGS Go client - application state and terminal front end
//!
//! This crate provides:
//! - The message-driven reducer that folds server batches into immutable
//!   [`AppState`] snapshots
//! - The store that owns the state, publishes snapshots and turns user
//!   intents into server requests
//! - ASCII rendering and stdin command parsing for the `kgsgo` binary

#![deny(unsafe_code)]

pub mod commands;
pub mod error;
pub mod reducer;
pub mod render;
pub mod report;
pub mod state;
pub mod store;

pub use error::ClientError;
pub use reducer::{reduce, reduce_batch, reduce_local, LocalAction, Navigation};
pub use state::{AppState, GameRecord, IdSequence};
pub use store::{Client, StoreLoop};
