//! Request parameters for the access facade
//!
//! Views build these values and hand them to the facade. They are kept
//! separate from the domain types because they describe what to do, not
//! what the backend stores.

pub mod job;
pub mod login;
pub mod object;
