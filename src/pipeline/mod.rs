//! Export contents of `pipeline` folder
mod clock;
mod config;
mod overlay;
mod pipeline_errors;
mod recognizer;
mod scheduler;
mod session;
mod summary;
mod video;

pub use self::{
    clock::*,
    config::*,
    overlay::*,
    pipeline_errors::*,
    recognizer::*,
    scheduler::*,
    session::*,
    summary::*,
    video::*,
};
