//! Factorio mod dependency resolver and fetcher.
//!
//! [`context::Context`] wires the pieces together: [`portal`] for registry
//! metadata, [`resolver`] for the depth-first walk, [`fetcher`] for cached and
//! mirrored artifact downloads, and [`install`] for copying into the game.

pub mod config;
pub mod logging;

pub mod checksum;
pub mod context;
pub mod control;
pub mod depspec;
pub mod error;
pub mod fetcher;
pub mod install;
pub mod mirrors;
pub mod modlist;
pub mod portal;
pub mod resolver;
pub mod storage;
pub mod transfer;
pub mod url_model;
pub mod version;

#[cfg(test)]
mod test_support;
