//! Upstream source and repository URLs

/// LLVM monorepo, built from source for the TSAN compiler stage
pub const LLVM_PROJECT_REPO: &str = "https://github.com/llvm/llvm-project.git";

/// clFFT repository
pub const CLFFT_REPO: &str = "https://github.com/clMathLibraries/clFFT.git";

/// hipSYCL repository
pub const HIPSYCL_REPO: &str = "https://github.com/illuhad/hipSYCL.git";

/// flex repository (doxygen source-build dependency)
pub const FLEX_REPO: &str = "https://github.com/westes/flex.git";

/// doxygen repository
pub const DOXYGEN_REPO: &str = "https://github.com/doxygen/doxygen.git";

/// doxygen prebuilt binary release area
pub const DOXYGEN_RELEASES: &str = "https://sourceforge.net/projects/doxygen/files";

/// OpenMPI release download area (versioned subdirectory appended)
pub const OPENMPI_DOWNLOADS: &str = "https://www.open-mpi.org/software/ompi";

/// CMake prebuilt installer release area
pub const CMAKE_RELEASES: &str = "https://github.com/Kitware/CMake/releases/download";

/// pyenv bootstrap installer
pub const PYENV_INSTALLER: &str = "https://pyenv.run";

/// Ubuntu toolchain PPA carrying recent GCC releases
pub const TOOLCHAIN_PPA: &str = "ppa:ubuntu-toolchain-r/test";

/// Intel OpenCL runtime PPA
pub const INTEL_OPENCL_PPA: &str = "ppa:intel-opencl/intel-opencl";

/// Intel oneAPI apt signing key
pub const INTEL_APT_KEY: &str =
    "https://apt.repos.intel.com/intel-gpg-keys/GPG-PUB-KEY-INTEL-SW-PRODUCTS-2023.PUB";

/// Intel oneAPI apt repository
pub const INTEL_APT_REPO: &str = "deb https://apt.repos.intel.com/oneapi all main";

/// ROCm apt signing key
pub const ROCM_APT_KEY: &str = "http://repo.radeon.com/rocm/apt/debian/rocm.gpg.key";

/// ROCm apt repository
pub const ROCM_APT_REPO: &str =
    "deb [arch=amd64] http://repo.radeon.com/rocm/apt/debian/ xenial main";
