//! BlackLake site library.
//!
//! This crate provides the site backend as a library, allowing the
//! contact pipeline to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
