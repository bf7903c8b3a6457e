//! Building-block fragment producers
//!
//! A building block bundles the multi-step installation recipe for one
//! component (a compiler, an MPI library, a build tool) into one or more
//! [`Fragment`](crate::recipe::Fragment)s that can be appended to any stage.
//! Blocks are pure fragment factories; they perform no I/O.
//!
//! # Submodules
//!
//! - [`compiler`] - Compiler resolution and toolchain descriptors
//! - [`mpi`] - OpenMPI source build
//! - [`cmake`] - Versioned CMake installs
//! - [`python`] - Python interpreter installs
//! - [`source`] - Generic CMake/autotools source builds

pub mod cmake;
pub mod compiler;
pub mod mpi;
pub mod python;
pub mod source;
