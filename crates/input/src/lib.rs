//! Logical input: platform key events are mapped to [`Action`]s by the app,
//! and the simulation only ever sees a [`HeldActions`] snapshot.
//!
//! # Invariants
//! - The simulation reads one snapshot per tick.
//! - Opposing actions held together cancel; neither wins.

pub mod action;

pub use action::{Action, HeldActions, ParseActionError};
