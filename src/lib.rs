//! tubevault: harvest YouTube channel data into a staging store and
//! warehouse it for a fixed catalog of analytical queries.
//!
//! The crate is organized as a pipeline:
//! - [`youtube`] wraps the Data API (pagination, batch chunking, rate limits)
//! - [`extract`] drives the client per channel into normalized record batches
//! - [`staging`] appends batches to a schemaless document store
//! - [`warehouse`] migrates staged documents into relational tables
//! - [`queries`] maps named analytical questions to warehouse reads

pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod queries;
pub mod staging;
pub mod warehouse;
pub mod youtube;
