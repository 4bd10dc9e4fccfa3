#![doc = "copybundle-core: core logic library for copybundle."]

//! This crate contains all shared logic, data models and pipelines for
//! copybundle: text normalization, per-platform constraint resolution and
//! copy adaptation, idea synthesis, image-prompt generation and bundle
//! assembly. CLI glue and the production completion provider live in the
//! `copybundle` binary crate.
//!
//! # Usage
//! Add this as a dependency for all shared pipeline, adaptation, config and
//! assembly code.

pub mod adapt;
pub mod bundle;
pub mod constraints;
pub mod contract;
pub mod idea;
pub mod normalize;
pub mod prompt;
pub mod quotes;
pub mod synthesize;
