//! Frame-rate admission and identity track bookkeeping for recognizer-driven video pipelines.
//!
//! A [`pipeline::Session`] reads frames from a [`pipeline::VideoSource`], lets a
//! [`pipeline::FrameScheduler`] decide which ones reach the external
//! [`pipeline::Recognizer`], and feeds the recognizer's per-frame results into a
//! [`mot::TrackManager`] that keeps identity-stable tracks.
pub mod mot;
pub mod pipeline;
pub mod replay;
pub mod utils;
