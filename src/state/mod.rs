//! State module for tracking a letter's crawl progress
//!
//! `LetterState` walks one letter from pagination discovery through each
//! listing page's link discovery, detail fan-out and batch write, ending in
//! either `Done` or `Aborted`.

mod letter_state;

pub use letter_state::LetterState;
