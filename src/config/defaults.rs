//! Package lists and pinned default versions

/// Basic packages for all final images
pub const COMMON_PACKAGES: &[&str] = &[
    "build-essential",
    "ca-certificates",
    "ccache",
    "git",
    "gnupg",
    "gpg-agent",
    "libfftw3-dev",
    "libhwloc-dev",
    "liblapack-dev",
    "libx11-dev",
    "moreutils",
    "ninja-build",
    "rsync",
    "valgrind",
    "vim",
    "wget",
    "xsltproc",
];

/// Extra packages for OpenCL-enabled images
///
/// The Intel packages require the intel-opencl PPA and the ROCm packages
/// require the ROCm apt repository; both are wired up by the aggregated
/// extra-packages fragment.
pub const OPENCL_EXTRA_PACKAGES: &[&str] = &[
    "nvidia-opencl-dev",
    "intel-opencl-icd",
    "ocl-icd-libopencl1",
    "ocl-icd-opencl-dev",
    "opencl-headers",
    "libelf1",
    "rocm-opencl",
    "rocm-dev",
    "clinfo",
];

/// Extra packages needed to build Python installations from source
pub const PYTHON_EXTRA_PACKAGES: &[&str] = &[
    "build-essential",
    "ca-certificates",
    "ccache",
    "curl",
    "git",
    "libbz2-dev",
    "libffi-dev",
    "liblzma-dev",
    "libncurses5-dev",
    "libncursesw5-dev",
    "libreadline-dev",
    "libsqlite3-dev",
    "libssl-dev",
    "llvm",
    "python-openssl",
    "vim",
    "wget",
    "zlib1g-dev",
];

/// Extra packages needed for images that build documentation
pub const DOCS_EXTRA_PACKAGES: &[&str] = &[
    "autoconf",
    "automake",
    "autopoint",
    "autotools-dev",
    "bison",
    "flex",
    "ghostscript",
    "graphviz",
    "help2man",
    "imagemagick",
    "libtool",
    "linkchecker",
    "mscgen",
    "m4",
    "openssh-client",
    "texinfo",
    "texlive-latex-base",
    "texlive-latex-extra",
    "texlive-fonts-recommended",
    "texlive-fonts-extra",
];

/// Dependencies installed into every Python venv
///
/// Keep this list synchronized with the CI requirements manifest of the
/// project whose images are being baked.
pub const VENV_REQUIREMENTS: &[&str] = &[
    "cmake>=3.16.3",
    "flake8>=3.7.7",
    "gcovr>=4.2",
    "mpi4py>=3.0.3",
    "networkx>=2.0",
    "numpy>=1",
    "pip>=10.1",
    "Pygments>=2.2.0",
    "pytest>=3.9",
    "setuptools>=42",
    "scikit-build>=0.10",
    "Sphinx>=1.6.3",
    "sphinxcontrib-plantuml>=0.14",
];

/// CMake version installed when none is requested
pub const DEFAULT_CMAKE_VERSION: &str = "3.16.3";

/// OpenMPI release built from source
pub const OPENMPI_VERSION: &str = "4.0.5";

/// Install prefix for the OpenMPI source build
pub const OPENMPI_PREFIX: &str = "/usr/local/openmpi";

/// Doxygen version that must be built from pinned source commits
pub const DOXYGEN_SOURCE_VERSION: &str = "1.8.5";

/// Pinned doxygen commit for the source-built version
pub const DOXYGEN_COMMIT: &str = "ed4ed873ab0e7f15116e2052119a6729d4589f7a";

/// Pinned flex commit used when building doxygen from source
pub const FLEX_COMMIT: &str = "f7788a9a0ecccdc953ed12043ccb59ca25714018";

/// Python minor version that still needs the importlib_resources backport
pub const IMPORTLIB_COMPAT_MINOR: u64 = 6;
