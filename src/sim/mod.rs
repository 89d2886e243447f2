//! Game session: state, operations, events, view model and puzzle catalog.

pub mod catalog;
pub mod event;
pub mod session;
pub mod step;
pub mod view;
