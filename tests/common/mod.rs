//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::process::{Command, Output};

/// Run the cibake binary with the given arguments
#[allow(dead_code)]
pub fn cibake(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cibake"))
        .args(args)
        .output()
        .expect("Failed to execute cibake")
}

/// Run cibake and return its stdout, asserting success
#[allow(dead_code)]
pub fn recipe(args: &[&str]) -> String {
    let output = cibake(args);
    assert!(
        output.status.success(),
        "cibake {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("Recipe should be valid UTF-8")
}

/// Run cibake expecting failure; returns stderr
#[allow(dead_code)]
pub fn recipe_error(args: &[&str]) -> String {
    let output = cibake(args);
    assert!(
        !output.status.success(),
        "cibake {:?} unexpectedly succeeded",
        args
    );
    assert!(
        output.stdout.is_empty(),
        "Failed invocation should produce no recipe output"
    );
    String::from_utf8(output.stderr).expect("Diagnostics should be valid UTF-8")
}

/// Byte offset of `needle` in `haystack`, panicking with context if absent
#[allow(dead_code)]
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("Expected to find {needle:?} in:\n{haystack}"))
}
