//! Ferry Core
//!
//! Core types and abstractions for the Ferry console.
//!
//! This crate contains:
//! - Domain types: Core business entities (Service, Job, Bucket, etc.)
//! - DTOs: Request parameters passed to the access facade
//! - State: The persisted client-side key-value store and credentials
//! - Routes: The route table and the router guard
//! - Menu: The navigation menu model
//! - Events: The publish/subscribe event bus shared by all views

pub mod domain;
pub mod dto;
pub mod events;
pub mod menu;
pub mod routes;
pub mod state;
