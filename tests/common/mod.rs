//! Common test utilities for venvstamp CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated project directory with a fake Python interpreter
//! - Fixtures: manifest contents and config snippets

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
