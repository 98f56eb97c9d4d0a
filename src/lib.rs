//! Session engines for typing practice: free typing metrics, the
//! learn-the-keys reaction drill and the rescue pressure-meter mode, plus
//! the JSON archive their finished sessions are written to.

pub mod config;
pub mod engine;
pub mod generator;
pub mod keyboard;
pub mod session;
pub mod store;
