//! Build option record
//!
//! An immutable record of the user's selections for one recipe. Constructed
//! once from the CLI and passed by reference through the composer.

use clap::ValueEnum;
use semver::Version;

use crate::error::ConfigError;
use crate::recipe::{Distro, Format};

/// MPI implementation selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpiImpl {
    /// OpenMPI, built from source with the resolved compiler
    #[value(name = "openmpi")]
    OpenMpi,
    /// Intel MPI (not implemented)
    #[value(name = "impi")]
    Impi,
}

/// The user's selections for one recipe
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Ubuntu version, mutually exclusive with `centos`
    pub ubuntu: Option<String>,
    /// CentOS version, mutually exclusive with `ubuntu`
    pub centos: Option<String>,
    /// CUDA version for an nvidia/cuda base image
    pub cuda: Option<String>,
    /// GCC major version
    pub gcc: Option<String>,
    /// LLVM major version
    pub llvm: Option<String>,
    /// Intel oneAPI version
    pub oneapi: Option<String>,
    /// Build a TSAN-instrumented clang from source (requires `llvm`)
    pub tsan: bool,
    /// MPI implementation
    pub mpi: Option<MpiImpl>,
    /// CMake versions, one versioned install prefix each
    pub cmake: Vec<String>,
    /// clFFT git branch to build
    pub clfft: Option<String>,
    /// hipSYCL git commit to build (requires `llvm`)
    pub hipsycl: Option<String>,
    /// Doxygen version
    pub doxygen: Option<String>,
    /// Python interpreter versions for the venv stages
    pub venvs: Vec<String>,
    /// Output recipe dialect
    pub format: Format,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            ubuntu: None,
            centos: None,
            cuda: None,
            gcc: None,
            llvm: None,
            oneapi: None,
            tsan: false,
            mpi: None,
            cmake: Vec::new(),
            clfft: None,
            hipsycl: None,
            doxygen: None,
            venvs: Vec::new(),
            format: Format::Docker,
        }
    }
}

impl BuildOptions {
    /// Base distribution of the image
    pub fn distro(&self) -> Result<Distro, ConfigError> {
        if self.centos.is_some() {
            Ok(Distro::Centos)
        } else if self.ubuntu.is_some() {
            Ok(Distro::Ubuntu)
        } else {
            Err(ConfigError::NoBaseOs)
        }
    }

    /// Base image tag, CUDA-enabled when a CUDA version is selected
    pub fn base_image_tag(&self) -> Result<String, ConfigError> {
        if let Some(cuda) = &self.cuda {
            let tag = format!("nvidia/cuda:{cuda}-devel");
            if let Some(centos) = &self.centos {
                Ok(format!("{tag}-centos{centos}"))
            } else if let Some(ubuntu) = &self.ubuntu {
                Ok(format!("{tag}-ubuntu{ubuntu}"))
            } else {
                Err(ConfigError::NoBaseOs)
            }
        } else if let Some(centos) = &self.centos {
            Ok(format!("centos:centos{centos}"))
        } else if let Some(ubuntu) = &self.ubuntu {
            Ok(format!("ubuntu:{ubuntu}"))
        } else {
            Err(ConfigError::NoBaseOs)
        }
    }

    /// CUDA version normalized to `x.y.z`
    ///
    /// clang insists on a three-component CUDA version while the option may
    /// be given as `x.y`.
    pub fn cuda_full_version(&self) -> Option<String> {
        let cuda = self.cuda.as_deref()?;
        let mut parts: Vec<&str> = cuda.split('.').collect();
        while parts.len() < 3 {
            parts.push("0");
        }
        Some(parts[..3].join("."))
    }

    /// Requested venv interpreter versions, parsed and sorted ascending
    pub fn sorted_venvs(&self) -> Result<Vec<Version>, ConfigError> {
        let mut versions = self
            .venvs
            .iter()
            .map(|v| parse_python_version(v))
            .collect::<Result<Vec<_>, _>>()?;
        versions.sort();
        Ok(versions)
    }
}

/// Parse a Python interpreter version, padding `X.Y` to `X.Y.0`
pub fn parse_python_version(value: &str) -> Result<Version, ConfigError> {
    let padded = if value.matches('.').count() == 1 {
        format!("{value}.0")
    } else {
        value.to_string()
    };
    Version::parse(&padded).map_err(|e| ConfigError::InvalidVenvVersion {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
