//! Tests for Singularity definition output
//!
//! The same composition must serialize to the Singularity dialect when
//! requested, with %post sections instead of RUN directives and %files
//! sections for cross-stage copies.

mod common;

use common::recipe;

/// The Singularity header replaces the FROM directive
#[test]
fn test_singularity_header() {
    let text = recipe(&[
        "--ubuntu", "20.04", "--gcc", "9", "--format", "singularity",
    ]);

    assert!(text.starts_with("Bootstrap: docker\nFrom: ubuntu:20.04\n"));
    assert!(!text.contains("FROM "));
    assert!(!text.contains("RUN "));
}

/// Shell batches become %post sections rooted at /
#[test]
fn test_singularity_post_sections() {
    let text = recipe(&[
        "--ubuntu", "20.04", "--gcc", "9", "--format", "singularity",
    ]);

    assert!(text.contains("%post\n    cd /\n    apt-get update -y"));
}

/// Named auxiliary stages carry a Stage: line and feed %files sections
#[test]
fn test_singularity_multi_stage_copies() {
    let text = recipe(&[
        "--ubuntu", "20.04", "--llvm", "11", "--tsan", "--format", "singularity",
    ]);

    assert!(text.contains("Stage: tsan"));
    assert!(text.contains("%files from tsan\n    /usr/local/ /usr/local"));
}

/// The two dialects serialize the same composition
#[test]
fn test_dialects_share_composition() {
    let args = ["--ubuntu", "20.04", "--gcc", "9", "--cmake", "3.18.0"];
    let docker = recipe(&args);

    let mut singularity_args = args.to_vec();
    singularity_args.extend(["--format", "singularity"]);
    let singularity = recipe(&singularity_args);

    // Same package list in both outputs
    for package in ["gcc-9", "g++-9", "cmake-3.18.0-linux-x86_64.sh"] {
        assert!(docker.contains(package), "Docker output missing {package}");
        assert!(
            singularity.contains(package),
            "Singularity output missing {package}"
        );
    }
}
