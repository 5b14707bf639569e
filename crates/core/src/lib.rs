//! # gymbot Core
//!
//! Domain types, traits, and error definitions for the gymbot workout
//! scheduler. This crate has **zero framework dependencies**: it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is defined as a trait here: persistence (`ScheduleStore`) and
//! transport (`Channel`). Implementations live in their respective crates,
//! so the conversation logic can be tested against in-memory stubs.

pub mod channel;
pub mod error;
pub mod schedule;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use channel::{Channel, ChannelId, ChannelMessage, Reply};
pub use error::{
    ChannelError, EmptyCollectionError, Error, Result, StoreError, ValidationError,
};
pub use schedule::{DaySchedule, ExerciseEntry, UserId, UserSchedule, Weekday, Weight};
pub use store::ScheduleStore;
