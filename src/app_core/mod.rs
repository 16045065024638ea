//! Shared application core: input types, state, and the event reducer.

pub mod input;
pub mod reducer;
pub mod state;
