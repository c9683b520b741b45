//! Pilot Pay Engine
//!
//! This crate calculates pilot pay from uploaded roster files. Airports are
//! resolved against a static reference table, duties are priced by a
//! prioritised salary rule table, and the resulting line items can be
//! exported as CSV, XLSX or plain text.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod directory;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod roster;
