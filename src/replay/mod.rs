//! Collaborators for replaying recorded recognizer output through a session
mod presenter;
mod recognizer;
mod sink;
mod source;

pub use self::{
    presenter::*,
    recognizer::*,
    sink::*,
    source::*,
};
