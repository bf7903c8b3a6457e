//! Tests for multi-stage composition
//!
//! Auxiliary stages must appear strictly before the stages that copy from
//! them, with `main` always last.

mod common;

use common::{position, recipe};

/// The TSAN compiler build stage precedes main and feeds it via copy
#[test]
fn test_tsan_stage_order_and_extraction() {
    let text = recipe(&["--ubuntu", "20.04", "--llvm", "11", "--tsan"]);

    let tsan = position(&text, "FROM ubuntu:20.04 AS tsan");
    let llvm_build = position(&text, "-b release/11.x");
    let main = position(&text, "\nFROM ubuntu:20.04\n");
    let copy = position(&text, "COPY --from=tsan /usr/local/ /usr/local");

    assert!(tsan < llvm_build && llvm_build < main);
    assert!(main < copy, "The extraction copy belongs to the main stage");

    // The sanitizer-enabled compiler is extracted, never package-installed
    assert!(!text.contains("clang-11 llvm-11"));
    assert!(text.contains("LIBOMP_TSAN_SUPPORT=on"));
}

/// The oneAPI install stage precedes main and feeds two copies
#[test]
fn test_oneapi_stage_order_and_extraction() {
    let text = recipe(&["--ubuntu", "20.04", "--oneapi", "2021.1.1"]);

    let aux = position(&text, "FROM ubuntu:20.04 AS oneapi-build");
    let main = position(&text, "\nFROM ubuntu:20.04\n");
    assert!(aux < main);

    assert_eq!(text.matches("COPY --from=oneapi-build").count(), 2);
    assert!(text.contains("intel-oneapi-dpcpp-cpp-2021.1.1"));
}

/// Interpreter stages come in ascending version order, collector last of them
#[test]
fn test_venv_stage_ordering() {
    let text = recipe(&[
        "--ubuntu", "20.04", "--gcc", "9", "--mpi", "openmpi", "--venvs", "3.9", "3.6.10",
    ]);

    let py36 = position(&text, "AS py3.6.10");
    let py39 = position(&text, "AS py3.9.0");
    let pyenv = position(&text, "AS pyenv");
    let main = position(&text, "\nFROM ubuntu:20.04\n");

    assert!(py36 < py39, "Interpreter stages sort ascending by version");
    assert!(py39 < pyenv, "The collector follows every interpreter stage");
    assert!(pyenv < main, "main is always last");

    // The collector aggregates each home tree, main pulls exactly two trees
    assert_eq!(text.matches("COPY --from=py3.6.10 /root/ /root").count(), 1);
    assert_eq!(text.matches("COPY --from=py3.9.0 /root/ /root").count(), 1);
    assert_eq!(text.matches("COPY --from=pyenv").count(), 2);
    assert!(text.contains("COPY --from=pyenv /root/.pyenv/ /root/.pyenv"));
    assert!(text.contains("COPY --from=pyenv /root/venv/ /root/venv"));
}

/// Venvs without an MPI selection produce no interpreter stages
#[test]
fn test_venvs_require_mpi() {
    let text = recipe(&["--ubuntu", "20.04", "--gcc", "9", "--venvs", "3.9"]);

    assert_eq!(text.matches("FROM ").count(), 1);
    assert!(!text.contains("pyenv"));
}

/// The compatibility backport lands only in the one minor version that needs it
#[test]
fn test_importlib_backport_is_version_specific() {
    let text = recipe(&[
        "--ubuntu", "20.04", "--gcc", "9", "--mpi", "openmpi", "--venvs", "3.6.10", "3.9",
    ]);

    let backport = position(&text, "importlib_resources");
    let py39 = position(&text, "AS py3.9.0");
    assert!(
        backport < py39,
        "Only the py3.6.10 stage installs importlib_resources"
    );
    assert_eq!(text.matches("importlib_resources").count(), 1);
}

/// OpenMPI is built with the resolved toolchain and the CUDA toggle
#[test]
fn test_openmpi_build_respects_compiler_and_cuda() {
    let text = recipe(&[
        "--ubuntu", "20.04", "--gcc", "9", "--mpi", "openmpi", "--cuda", "11.0",
    ]);
    assert!(text.contains("CC=gcc-9 CXX=g++-9"));
    assert!(text.contains("--with-cuda"));

    let text = recipe(&["--ubuntu", "20.04", "--llvm", "11", "--mpi", "openmpi"]);
    assert!(text.contains("CC=clang-11 CXX=clang++-11"));
    assert!(text.contains("--without-cuda"));
}
