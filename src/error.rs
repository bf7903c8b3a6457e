//! Error types for cibake
//!
//! Domain-specific error types using thiserror. All composition failures
//! surface before any recipe text is written, preserving the all-or-nothing
//! emission contract.

use thiserror::Error;

/// Invalid or contradictory build option combinations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No base Linux distribution selected
    #[error("No base Linux distribution selected. Use --ubuntu or --centos")]
    NoBaseOs,

    /// No compiler toolchain selected
    #[error("No compiler toolchain selected. Use --gcc, --llvm, or --oneapi")]
    NoCompiler,

    /// Sanitizer build requires LLVM
    #[error("--tsan requires an LLVM compiler (--llvm)")]
    TsanWithoutLlvm,

    /// hipSYCL requires LLVM
    #[error("Cannot build hipSYCL without an LLVM compiler (--llvm)")]
    HipSyclWithoutLlvm,

    /// The resolved compiler exposes no toolchain for source builds
    #[error("Compiler '{compiler}' has no toolchain descriptor to build OpenMPI with")]
    CompilerWithoutToolchain { compiler: String },

    /// Unparseable Python interpreter version
    #[error("Invalid Python version '{value}': {reason}")]
    InvalidVenvVersion { value: String, reason: String },

    /// Venv stages requested with an empty version list
    #[error("No Python versions requested for the venv stages")]
    NoVenvVersions,
}

/// Features that are explicitly not implemented
#[derive(Error, Debug)]
pub enum UnsupportedError {
    /// Intel MPI recipe is not implemented
    #[error("Intel MPI recipe is not implemented yet")]
    IntelMpi,

    /// OpenMPI cannot be built with the oneAPI toolchain
    #[error("Building OpenMPI with the oneAPI toolchain is not supported")]
    OneApiOpenMpi,
}

/// Internal stage-sequencing bugs
///
/// These indicate a defect in the composer itself, not in the user's
/// selections: a stage was referenced before it was defined.
#[derive(Error, Debug)]
pub enum SequenceError {
    /// A compiler variant needs an auxiliary build stage that was never created
    #[error("Compiler build stage '{stage}' was not created before it was referenced")]
    MissingCompilerStage { stage: String },

    /// A copy fragment references a stage not yet in the sequence
    #[error("Stage '{stage}' copies from undefined stage '{from}'")]
    ForwardStageReference { stage: String, from: String },
}

/// Top-level composition error type
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(#[from] UnsupportedError),

    /// Internal sequencing error
    #[error("Internal sequencing error: {0}")]
    Sequence(#[from] SequenceError),
}
