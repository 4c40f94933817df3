//! Core domain types
//!
//! This module contains the core domain structures used across Ferry crates.
//! These types mirror what the control plane and the object store return
//! and are shared between the access facade and the views that render them.

pub mod job;
pub mod service;
pub mod storage;
pub mod system;
