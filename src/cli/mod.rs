//! Command-line interface module
//!
//! This module handles argument parsing and output. It contains no
//! composition logic - that belongs in the [`crate::compose`] module.

pub mod output;

use anyhow::Result;
use clap::Parser;

use crate::compose::{self, BuildOptions, MpiImpl};
use crate::config::defaults;
use crate::recipe::{render, Format};

/// cibake - CI container recipe composer
///
/// Compose Dockerfile or Singularity definition recipes for CI build
/// environments from a matrix of toolchain selections.
#[derive(Parser, Debug)]
#[command(name = "cibake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ubuntu version for the base image
    #[arg(long, value_name = "VERSION", conflicts_with = "centos")]
    pub ubuntu: Option<String>,

    /// CentOS version for the base image
    #[arg(long, value_name = "VERSION")]
    pub centos: Option<String>,

    /// CUDA version; switches to an nvidia/cuda base image
    #[arg(long, value_name = "VERSION")]
    pub cuda: Option<String>,

    /// GCC major version to install
    #[arg(long, value_name = "VERSION", conflicts_with_all = ["llvm", "oneapi"])]
    pub gcc: Option<String>,

    /// LLVM major version to install
    #[arg(long, value_name = "VERSION", conflicts_with = "oneapi")]
    pub llvm: Option<String>,

    /// Intel oneAPI version to install
    #[arg(long, value_name = "VERSION")]
    pub oneapi: Option<String>,

    /// Build a TSAN-instrumented clang from source (requires --llvm)
    #[arg(long)]
    pub tsan: bool,

    /// MPI implementation to install
    #[arg(long, value_enum, value_name = "IMPL")]
    pub mpi: Option<MpiImpl>,

    /// CMake versions to install, each under its own prefix
    #[arg(
        long,
        value_name = "VERSION",
        num_args = 1..,
        default_values_t = [defaults::DEFAULT_CMAKE_VERSION.to_string()]
    )]
    pub cmake: Vec<String>,

    /// clFFT git branch to build from source
    #[arg(long, value_name = "BRANCH")]
    pub clfft: Option<String>,

    /// hipSYCL git commit to build from source (requires --llvm)
    #[arg(long, value_name = "COMMIT")]
    pub hipsycl: Option<String>,

    /// Doxygen version for documentation images
    #[arg(long, value_name = "VERSION")]
    pub doxygen: Option<String>,

    /// Python interpreter versions to provision as venvs
    #[arg(long, value_name = "VERSION", num_args = 1..)]
    pub venvs: Vec<String>,

    /// Recipe output format
    #[arg(long, value_enum, default_value_t = Format::Docker)]
    pub format: Format,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// The build option record for these arguments
    pub fn into_options(self) -> BuildOptions {
        BuildOptions {
            ubuntu: self.ubuntu,
            centos: self.centos,
            cuda: self.cuda,
            gcc: self.gcc,
            llvm: self.llvm,
            oneapi: self.oneapi,
            tsan: self.tsan,
            mpi: self.mpi,
            cmake: self.cmake,
            clfft: self.clfft,
            hipsycl: self.hipsycl,
            doxygen: self.doxygen,
            venvs: self.venvs,
            format: self.format,
        }
    }

    /// Compose the recipe and write it to stdout
    pub fn run(self) -> Result<()> {
        let options = self.into_options();
        let format = options.format;
        let distro = options.distro()?;
        let stages = compose::compose(&options)?;
        print!("{}", render(&stages, format, distro));
        Ok(())
    }
}
