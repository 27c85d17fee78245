//! # Voxline Calendar
//! Google Calendar implementation of the `MeetingScheduler` collaborator.

pub mod client;

pub use client::CalendarClient;
