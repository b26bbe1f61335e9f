// Disco daemon library
// Exposes the discovery records and ticket admission for the binaries and tests

#![allow(clippy::uninlined_format_args)]

extern crate log;

pub mod config;
pub mod discovery;
