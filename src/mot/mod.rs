//! Export contents of `mot` folder
mod matching;
mod recognition;
mod track;
mod track_manager;

pub use self::{
    matching::*,
    recognition::*,
    track::*,
    track_manager::*,
};
