//! Compiler resolution and toolchain descriptors
//!
//! A compiler resolves to exactly one of four variants, decided once at
//! composition time. Each variant knows how to materialize itself into a
//! stage: the package-based variants install from the distribution
//! repositories, the stage-backed variants extract the installed runtime
//! subtree from their auxiliary build stage.

use crate::config::urls;
use crate::recipe::Fragment;

/// Stage name of the TSAN compiler build
pub const TSAN_STAGE: &str = "tsan";

/// Stage name of the oneAPI toolkit install
pub const ONEAPI_STAGE: &str = "oneapi-build";

/// C/C++ compiler paths handed to source builds (OpenMPI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cc: String,
    pub cxx: String,
}

/// The resolved compiler for a recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compiler {
    /// GCC major release from the toolchain PPA
    Gnu { version: String },
    /// Plain clang release from the distribution repositories
    Llvm { version: String },
    /// TSAN-instrumented clang built from source in the `tsan` stage
    TsanBuild { llvm_version: String },
    /// Intel oneAPI toolkit installed in the `oneapi-build` stage
    OneApi { version: String },
}

impl Compiler {
    /// Short name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gnu { .. } => "gcc",
            Self::Llvm { .. } => "llvm",
            Self::TsanBuild { .. } => "tsan-llvm",
            Self::OneApi { .. } => "oneapi",
        }
    }

    /// Toolchain descriptor for in-recipe source builds
    ///
    /// The sanitizer-built compiler exposes none: its binaries only exist in
    /// the auxiliary stage, so nothing built in the main stage can link
    /// against it during the image build.
    pub fn toolchain(&self) -> Option<Toolchain> {
        match self {
            Self::Gnu { version } => Some(Toolchain {
                cc: format!("gcc-{version}"),
                cxx: format!("g++-{version}"),
            }),
            Self::Llvm { version } => Some(Toolchain {
                cc: format!("clang-{version}"),
                cxx: format!("clang++-{version}"),
            }),
            Self::TsanBuild { .. } => None,
            Self::OneApi { version } => Some(Toolchain {
                cc: format!("/opt/intel/oneapi/compiler/{version}/linux/bin/intel64/icx"),
                cxx: format!("/opt/intel/oneapi/compiler/{version}/linux/bin/intel64/icpx"),
            }),
        }
    }

    /// Fragments that install this compiler into a stage
    pub fn fragments(&self) -> Vec<Fragment> {
        match self {
            Self::Gnu { version } => vec![
                Fragment::Packages {
                    ospackages: vec![format!("gcc-{version}"), format!("g++-{version}")],
                    apt_ppas: vec![urls::TOOLCHAIN_PPA.to_string()],
                    apt_keys: Vec::new(),
                    apt_repositories: Vec::new(),
                },
                Fragment::shell([
                    format!(
                        "update-alternatives --install /usr/bin/gcc gcc /usr/bin/gcc-{version} 30"
                    ),
                    format!(
                        "update-alternatives --install /usr/bin/g++ g++ /usr/bin/g++-{version} 30"
                    ),
                ]),
            ],
            Self::Llvm { version } => vec![
                Fragment::packages([format!("clang-{version}"), format!("llvm-{version}")]),
                Fragment::shell([
                    format!(
                        "update-alternatives --install /usr/bin/clang clang \
                         /usr/bin/clang-{version} 30"
                    ),
                    format!(
                        "update-alternatives --install /usr/bin/clang++ clang++ \
                         /usr/bin/clang++-{version} 30"
                    ),
                ]),
            ],
            // Runtime extraction: only the installed prefix crosses the
            // stage boundary, never the LLVM build tree.
            Self::TsanBuild { .. } => {
                vec![Fragment::copy_from(TSAN_STAGE, "/usr/local/", "/usr/local")]
            }
            Self::OneApi { .. } => vec![
                Fragment::copy_from(ONEAPI_STAGE, "/opt/intel", "/opt/intel"),
                Fragment::copy_from(ONEAPI_STAGE, "/etc/bash.bashrc", "/etc/bash.bashrc"),
            ],
        }
    }
}
