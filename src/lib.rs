//! Cibake - CI container recipe generator
//!
//! This library composes pre-built "building block" fragments (package
//! installs, compiler toolchains, MPI libraries, CMake versions, Python
//! environments) into an ordered sequence of container build stages, and
//! serializes the sequence as a Dockerfile or Singularity definition.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`compose`] - The recipe composer (pure, no I/O operations)
//! - [`blocks`] - Building-block fragment producers
//! - [`recipe`] - Stage/fragment data model and serializers
//! - [`config`] - Package lists, pinned versions, and upstream URLs
//! - [`error`] - Error types and handling

pub mod blocks;
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod recipe;
