//! Pure game rules and puzzle data. No I/O, no session state.

pub mod puzzle;
pub mod rules;
