//! The recipe composer
//!
//! `compose` turns a [`BuildOptions`] record into an ordered
//! [`StageSequence`]: zero or more auxiliary stages followed by the `main`
//! stage. All validation happens here, before any output is produced.
//!
//! # Submodules
//!
//! - [`options`] - The build option record and its derived values
//! - [`aux_stages`] - Auxiliary stage builders (TSAN, oneAPI, venvs)

pub mod aux_stages;
pub mod options;

pub use aux_stages::PYENV_STAGE;
pub use options::{BuildOptions, MpiImpl};

use crate::blocks::compiler::{Compiler, ONEAPI_STAGE, TSAN_STAGE};
use crate::blocks::source::{AutotoolsSourceBuild, CmakeSourceBuild};
use crate::blocks::{cmake, mpi, python};
use crate::config::{defaults, urls};
use crate::error::{ComposeError, ConfigError, SequenceError, UnsupportedError};
use crate::recipe::{Fragment, Stage, StageSequence};

/// Name of the final stage; always emitted last
pub const MAIN_STAGE: &str = "main";

/// The named building blocks of the main stage, in definition order
///
/// One typed field per block kind; an empty field means the block is absent.
/// Definition order is append order, and the most expensive, most cacheable
/// blocks come first so incremental rebuilds reuse cached layers maximally.
/// That ordering is a performance contract, not a style choice.
#[derive(Debug, Default)]
pub struct BuildingBlocks {
    pub base_packages: Vec<Fragment>,
    pub compiler: Vec<Fragment>,
    pub mpi: Vec<Fragment>,
    pub cmake: Vec<Fragment>,
    pub extra_packages: Vec<Fragment>,
    pub cuda_clang_workaround: Vec<Fragment>,
    pub clfft: Vec<Fragment>,
    pub hipsycl: Vec<Fragment>,
}

impl BuildingBlocks {
    /// Every present fragment, in definition order
    pub fn in_order(&self) -> impl Iterator<Item = &Fragment> {
        self.base_packages
            .iter()
            .chain(&self.compiler)
            .chain(&self.mpi)
            .chain(&self.cmake)
            .chain(&self.extra_packages)
            .chain(&self.cuda_clang_workaround)
            .chain(&self.clfft)
            .chain(&self.hipsycl)
    }
}

/// Compose the full stage sequence for the given options
///
/// Auxiliary stages are emitted strictly before any stage that copies from
/// them; `main` is always last. Fails fast on invalid or contradictory
/// selections, before any stage is created.
pub fn compose(options: &BuildOptions) -> Result<StageSequence, ComposeError> {
    let base_image = options.base_image_tag()?;
    if options.tsan && options.llvm.is_none() {
        return Err(ConfigError::TsanWithoutLlvm.into());
    }

    let mut stages = StageSequence::new();

    // Expensive compiler builds go into their own isolated stages so the
    // compiler images don't carry the cruft needed to produce them.
    if options.tsan {
        if let Some(llvm) = &options.llvm {
            tracing::debug!("adding TSAN compiler build stage for LLVM {llvm}");
            stages.push(aux_stages::tsan_build_stage(options, llvm)?)?;
        }
    }
    if let Some(oneapi) = &options.oneapi {
        tracing::debug!("adding oneAPI build stage for version {oneapi}");
        stages.push(aux_stages::oneapi_build_stage(options, oneapi)?)?;
    }

    let compiler = resolve_compiler(options, &stages)?;
    let blocks = assemble_blocks(options, &compiler)?;

    // Venv stages only make sense on MPI images; otherwise mpi4py could not
    // be installed into the venvs.
    if options.mpi.is_some() && !options.venvs.is_empty() {
        for stage in aux_stages::python_stages(options, &blocks.compiler, &blocks.mpi)? {
            tracing::debug!("adding Python stage '{}'", stage.name());
            stages.push(stage)?;
        }
    }

    let mut main = Stage::new(MAIN_STAGE);
    main.push(Fragment::base_image(base_image));
    main.extend(blocks.in_order().cloned());
    main.push(python::python3(true));

    if let Some(doxygen) = &options.doxygen {
        main.extend(documentation_fragments(doxygen));
    }

    if stages.contains(PYENV_STAGE) {
        main.push(Fragment::copy_from(PYENV_STAGE, "/root/.pyenv/", "/root/.pyenv"));
        main.push(Fragment::copy_from(PYENV_STAGE, "/root/venv/", "/root/venv"));
    }

    main.push(python::ensure_default_python());
    stages.push(main)?;

    tracing::debug!("composed {} stage(s)", stages.len());
    Ok(stages)
}

/// Resolve the compiler variant for these options
///
/// Priority: sanitizer build, then oneAPI, then the package-based installs.
/// The stage-backed variants require their auxiliary stage to already be in
/// the sequence; a miss is an internal sequencing bug, not a user error.
fn resolve_compiler(
    options: &BuildOptions,
    stages: &StageSequence,
) -> Result<Compiler, ComposeError> {
    if options.tsan {
        if let Some(llvm) = &options.llvm {
            if !stages.contains(TSAN_STAGE) {
                return Err(SequenceError::MissingCompilerStage {
                    stage: TSAN_STAGE.to_string(),
                }
                .into());
            }
            return Ok(Compiler::TsanBuild {
                llvm_version: llvm.clone(),
            });
        }
    }
    if let Some(version) = &options.oneapi {
        if !stages.contains(ONEAPI_STAGE) {
            return Err(SequenceError::MissingCompilerStage {
                stage: ONEAPI_STAGE.to_string(),
            }
            .into());
        }
        return Ok(Compiler::OneApi {
            version: version.clone(),
        });
    }
    if let Some(version) = &options.gcc {
        return Ok(Compiler::Gnu {
            version: version.clone(),
        });
    }
    if let Some(version) = &options.llvm {
        return Ok(Compiler::Llvm {
            version: version.clone(),
        });
    }
    Err(ConfigError::NoCompiler.into())
}

/// Assemble the main-stage building blocks in definition order
fn assemble_blocks(
    options: &BuildOptions,
    compiler: &Compiler,
) -> Result<BuildingBlocks, ComposeError> {
    let mut blocks = BuildingBlocks {
        base_packages: vec![Fragment::packages(defaults::COMMON_PACKAGES.iter().copied())],
        compiler: compiler.fragments(),
        mpi: mpi_fragments(options, compiler)?,
        ..Default::default()
    };

    for version in &options.cmake {
        blocks
            .cmake
            .push(cmake::cmake(version, &cmake::versioned_prefix(version)));
    }

    blocks.extra_packages = extra_packages(options);

    if let (Some(cuda), Some(_)) = (options.cuda_full_version(), &options.llvm) {
        // clang reads this file to detect the CUDA toolkit version.
        blocks.cuda_clang_workaround = vec![Fragment::shell([format!(
            "echo \"CUDA Version {cuda}\" > /usr/local/cuda/version.txt"
        )])];
    }

    if let Some(branch) = &options.clfft {
        blocks.clfft = vec![
            CmakeSourceBuild::new(urls::CLFFT_REPO, "/usr/local")
                .recursive()
                .branch(branch)
                .source_subdir("src")
                .fragment(),
        ];
    }

    blocks.hipsycl = hipsycl_fragments(options)?;

    Ok(blocks)
}

/// MPI fragments for the resolved compiler, if an implementation is selected
fn mpi_fragments(
    options: &BuildOptions,
    compiler: &Compiler,
) -> Result<Vec<Fragment>, ComposeError> {
    match options.mpi {
        None => Ok(Vec::new()),
        Some(MpiImpl::OpenMpi) => {
            if matches!(compiler, Compiler::OneApi { .. }) {
                return Err(UnsupportedError::OneApiOpenMpi.into());
            }
            let toolchain =
                compiler
                    .toolchain()
                    .ok_or_else(|| ConfigError::CompilerWithoutToolchain {
                        compiler: compiler.name().to_string(),
                    })?;
            Ok(mpi::openmpi(&toolchain, options.cuda.is_some()))
        }
        Some(MpiImpl::Impi) => Err(UnsupportedError::IntelMpi.into()),
    }
}

/// Extra LLVM tooling packages when clang comes from the distribution
fn llvm_packages(options: &BuildOptions) -> Vec<String> {
    let Some(llvm) = &options.llvm else {
        return Vec::new();
    };
    // The source-built TSAN compiler already ships these tools.
    if options.tsan {
        return Vec::new();
    }
    let mut packages = vec![
        format!("libomp-{llvm}-dev"),
        format!("libomp5-{llvm}"),
        format!("clang-format-{llvm}"),
        format!("clang-tidy-{llvm}"),
    ];
    if options.hipsycl.is_some() {
        packages.push(format!("llvm-{llvm}-dev"));
        packages.push(format!("libclang-{llvm}-dev"));
        packages.push(format!("lld-{llvm}"));
    }
    packages
}

/// OpenCL runtime packages, skipped on documentation and oneAPI images
fn opencl_packages(options: &BuildOptions) -> Vec<String> {
    if options.doxygen.is_none() && options.oneapi.is_none() {
        defaults::OPENCL_EXTRA_PACKAGES
            .iter()
            .map(ToString::to_string)
            .collect()
    } else {
        Vec::new()
    }
}

/// Aggregate every conditionally-required OS package into one fragment
///
/// Installed early in the build to optimize layer caching. Duplicate names
/// across fragments are harmless and deliberately not deduplicated.
fn extra_packages(options: &BuildOptions) -> Vec<Fragment> {
    let mut ospackages = llvm_packages(options);
    ospackages.extend(opencl_packages(options));
    if options.doxygen.is_some() {
        ospackages.extend(defaults::DOCS_EXTRA_PACKAGES.iter().map(ToString::to_string));
    }
    if options.oneapi.is_some() {
        ospackages.push("lsb-release".to_string());
    }
    if options.hipsycl.is_some() {
        ospackages.push("libboost-fiber-dev".to_string());
    }
    if ospackages.is_empty() {
        return Vec::new();
    }
    vec![Fragment::Packages {
        ospackages,
        apt_ppas: vec![urls::INTEL_OPENCL_PPA.to_string()],
        apt_keys: vec![urls::ROCM_APT_KEY.to_string()],
        apt_repositories: vec![urls::ROCM_APT_REPO.to_string()],
    }]
}

/// hipSYCL source build against the distribution clang
fn hipsycl_fragments(options: &BuildOptions) -> Result<Vec<Fragment>, ComposeError> {
    let Some(commit) = &options.hipsycl else {
        return Ok(Vec::new());
    };
    let Some(llvm) = &options.llvm else {
        return Err(ConfigError::HipSyclWithoutLlvm.into());
    };

    let mut cmake_opts = vec![
        "-DCMAKE_BUILD_TYPE=Release".to_string(),
        format!("-DLLVM_DIR=/usr/lib/llvm-{llvm}/cmake"),
        format!("-DCLANG_EXECUTABLE_PATH=/usr/bin/clang++-{llvm}"),
        "-DCMAKE_PREFIX_PATH=/opt/rocm/lib/cmake".to_string(),
        "-DWITH_ROCM_BACKEND=ON".to_string(),
    ];
    if options.cuda.is_some() {
        cmake_opts.push("-DCUDA_TOOLKIT_ROOT_DIR=/usr/local/cuda".to_string());
        cmake_opts.push("-DWITH_CUDA_BACKEND=ON".to_string());
    }

    // The ROCm bitcode symlinks work around device-library lookup paths in
    // hipSYCL's clang driver.
    let mut postinstall = vec![
        "for f in /opt/rocm/amdgcn/bitcode/*.bc; do \
         ln -s \"$f\" \"/opt/rocm/lib/$(basename $f .bc).amdgcn.bc\"; done"
            .to_string(),
    ];
    if options.cuda.is_some() {
        postinstall.push(format!(
            "sed s/_OPENMP/__OPENMP_NVPTX__/ -i \
             /usr/lib/llvm-{llvm}/lib/clang/*/include/__clang_cuda_complex_builtins.h"
        ));
        postinstall.push("ln -s /usr/local/cuda/compat/* /usr/local/cuda/lib64/".to_string());
    }

    Ok(vec![
        CmakeSourceBuild::new(urls::HIPSYCL_REPO, "/usr/local")
            .recursive()
            .commit(commit)
            .cmake_opts(cmake_opts)
            .postinstall(postinstall)
            .fragment(),
    ])
}

/// Documentation toolchain fragments for the main stage
///
/// One historical doxygen version has to be built from pinned source
/// commits; every other version ships as a prebuilt binary archive.
fn documentation_fragments(version: &str) -> Vec<Fragment> {
    let mut fragments = vec![Fragment::shell([
        "sed -i '/\"XPS\"/d;/\"PDF\"/d;/\"PS\"/d;/\"EPS\"/d;\
         /disable ghostscript format types/d' /etc/ImageMagick-6/policy.xml",
    ])];

    if version == defaults::DOXYGEN_SOURCE_VERSION {
        fragments.push(
            AutotoolsSourceBuild::new(urls::FLEX_REPO, "/tmp/install-of-flex")
                .commit(defaults::FLEX_COMMIT)
                .preconfigure(["./autogen.sh"])
                .configure_opts(["--disable-shared"])
                .fragment(),
        );
        fragments.push(
            AutotoolsSourceBuild::new(urls::DOXYGEN_REPO, "")
                .commit(defaults::DOXYGEN_COMMIT)
                .configure_opts(["--flex /tmp/install-of-flex/bin/flex", "--static"])
                .fragment(),
        );
    } else {
        let archive = format!("doxygen-{version}.linux.bin.tar.gz");
        let url = format!("{}/rel-{version}/{archive}", urls::DOXYGEN_RELEASES);
        let binary = format!("doxygen-{version}/bin/doxygen");
        fragments.push(Fragment::shell([
            "mkdir doxygen && cd doxygen".to_string(),
            format!("wget {url}"),
            format!("tar xf {archive} {binary}"),
            format!("cp {binary} /usr/local/bin/"),
            "cd .. && rm -rf doxygen".to_string(),
        ]));
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{render, Format};

    fn gcc_options() -> BuildOptions {
        BuildOptions {
            ubuntu: Some("20.04".to_string()),
            gcc: Some("9".to_string()),
            cmake: vec!["3.18.0".to_string()],
            ..Default::default()
        }
    }

    fn stage_names(stages: &StageSequence) -> Vec<&str> {
        stages.stages().iter().map(Stage::name).collect()
    }

    #[test]
    fn test_minimal_options_yield_single_main_stage() {
        let stages = compose(&gcc_options()).unwrap();
        assert_eq!(stage_names(&stages), [MAIN_STAGE]);

        // Base image, base packages, gcc install (packages + alternatives),
        // cmake install, OpenCL runtimes, default python, ensure-python.
        let main = &stages.stages()[0];
        let kinds: Vec<&str> = main
            .fragments()
            .iter()
            .map(|f| match f {
                Fragment::BaseImage { .. } => "base",
                Fragment::Packages { .. } => "packages",
                Fragment::Shell { .. } => "shell",
                Fragment::Copy { .. } => "copy",
            })
            .collect();
        assert_eq!(
            kinds,
            [
                "base", "packages", "packages", "shell", "shell", "packages", "packages",
                "shell"
            ]
        );
        assert!(main.copy_sources().next().is_none());
    }

    #[test]
    fn test_tsan_stage_precedes_main_and_feeds_its_compiler() {
        let options = BuildOptions {
            llvm: Some("11".to_string()),
            tsan: true,
            gcc: None,
            ..gcc_options()
        };
        let stages = compose(&options).unwrap();
        assert_eq!(stage_names(&stages), [TSAN_STAGE, MAIN_STAGE]);

        let main = stages.stages().last().unwrap();
        let copies: Vec<&str> = main.copy_sources().collect();
        assert_eq!(copies, [TSAN_STAGE]);

        // The compiler must come from the runtime extraction, never from a
        // clang package install.
        let installs_clang = main.fragments().iter().any(|f| match f {
            Fragment::Packages { ospackages, .. } => {
                ospackages.iter().any(|p| p.starts_with("clang-11"))
            }
            _ => false,
        });
        assert!(!installs_clang);
    }

    #[test]
    fn test_oneapi_stage_precedes_main() {
        let options = BuildOptions {
            oneapi: Some("2021.1.1".to_string()),
            gcc: None,
            ..gcc_options()
        };
        let stages = compose(&options).unwrap();
        assert_eq!(stage_names(&stages), [ONEAPI_STAGE, MAIN_STAGE]);
    }

    #[test]
    fn test_oneapi_with_openmpi_is_unsupported() {
        let options = BuildOptions {
            oneapi: Some("2021.1.1".to_string()),
            gcc: None,
            mpi: Some(MpiImpl::OpenMpi),
            ..gcc_options()
        };
        let err = compose(&options).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Unsupported(UnsupportedError::OneApiOpenMpi)
        ));
    }

    #[test]
    fn test_intel_mpi_is_unsupported() {
        let options = BuildOptions {
            mpi: Some(MpiImpl::Impi),
            ..gcc_options()
        };
        let err = compose(&options).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Unsupported(UnsupportedError::IntelMpi)
        ));
    }

    #[test]
    fn test_tsan_compiler_cannot_build_openmpi() {
        let options = BuildOptions {
            llvm: Some("11".to_string()),
            tsan: true,
            gcc: None,
            mpi: Some(MpiImpl::OpenMpi),
            ..gcc_options()
        };
        let err = compose(&options).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Config(ConfigError::CompilerWithoutToolchain { .. })
        ));
    }

    #[test]
    fn test_venv_stages_in_version_order_with_two_main_copies() {
        let options = BuildOptions {
            mpi: Some(MpiImpl::OpenMpi),
            venvs: vec!["3.9".to_string(), "3.6.10".to_string()],
            ..gcc_options()
        };
        let stages = compose(&options).unwrap();
        assert_eq!(
            stage_names(&stages),
            ["py3.6.10", "py3.9.0", PYENV_STAGE, MAIN_STAGE]
        );

        let main = stages.stages().last().unwrap();
        let pyenv_copies = main
            .copy_sources()
            .filter(|s| *s == PYENV_STAGE)
            .count();
        assert_eq!(pyenv_copies, 2);
    }

    #[test]
    fn test_venvs_without_mpi_add_no_stages() {
        let options = BuildOptions {
            venvs: vec!["3.9".to_string()],
            ..gcc_options()
        };
        let stages = compose(&options).unwrap();
        assert_eq!(stage_names(&stages), [MAIN_STAGE]);
    }

    #[test]
    fn test_no_base_os_fails() {
        let options = BuildOptions {
            gcc: Some("9".to_string()),
            ..Default::default()
        };
        let err = compose(&options).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Config(ConfigError::NoBaseOs)
        ));
    }

    #[test]
    fn test_no_compiler_fails() {
        let options = BuildOptions {
            ubuntu: Some("20.04".to_string()),
            ..Default::default()
        };
        let err = compose(&options).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Config(ConfigError::NoCompiler)
        ));
    }

    #[test]
    fn test_tsan_without_llvm_fails() {
        let options = BuildOptions {
            tsan: true,
            ..gcc_options()
        };
        let err = compose(&options).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Config(ConfigError::TsanWithoutLlvm)
        ));
    }

    #[test]
    fn test_hipsycl_without_llvm_fails() {
        let options = BuildOptions {
            hipsycl: Some("abc123".to_string()),
            ..gcc_options()
        };
        let err = compose(&options).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Config(ConfigError::HipSyclWithoutLlvm)
        ));
    }

    #[test]
    fn test_multiple_cmake_versions_get_distinct_prefixes() {
        let options = BuildOptions {
            cmake: vec!["3.17.2".to_string(), "3.18.0".to_string()],
            ..gcc_options()
        };
        let stages = compose(&options).unwrap();
        let text = render(&stages, Format::Docker, options.distro().unwrap());
        assert!(text.contains("--prefix=/usr/local/cmake-3.17.2"));
        assert!(text.contains("--prefix=/usr/local/cmake-3.18.0"));
    }

    #[test]
    fn test_cuda_clang_workaround_normalizes_version() {
        let options = BuildOptions {
            llvm: Some("11".to_string()),
            gcc: None,
            cuda: Some("11.0".to_string()),
            ..gcc_options()
        };
        let stages = compose(&options).unwrap();
        let text = render(&stages, Format::Docker, options.distro().unwrap());
        assert!(text.contains("echo \"CUDA Version 11.0.0\" > /usr/local/cuda/version.txt"));
    }

    #[test]
    fn test_docs_image_swaps_opencl_for_docs_packages() {
        let options = BuildOptions {
            doxygen: Some("1.8.17".to_string()),
            ..gcc_options()
        };
        let stages = compose(&options).unwrap();
        let text = render(&stages, Format::Docker, options.distro().unwrap());
        assert!(text.contains("texlive-latex-base"));
        assert!(!text.contains("rocm-opencl"));
        // Prebuilt archive path, not the pinned source build.
        assert!(text.contains("doxygen-1.8.17.linux.bin.tar.gz"));
        assert!(!text.contains("install-of-flex"));
    }

    #[test]
    fn test_historic_doxygen_builds_from_pinned_commits() {
        let options = BuildOptions {
            doxygen: Some("1.8.5".to_string()),
            ..gcc_options()
        };
        let stages = compose(&options).unwrap();
        let text = render(&stages, Format::Docker, options.distro().unwrap());
        assert!(text.contains(defaults::FLEX_COMMIT));
        assert!(text.contains(defaults::DOXYGEN_COMMIT));
        assert!(text.contains("--flex /tmp/install-of-flex/bin/flex"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let options = BuildOptions {
            mpi: Some(MpiImpl::OpenMpi),
            venvs: vec!["3.7".to_string()],
            doxygen: Some("1.8.17".to_string()),
            ..gcc_options()
        };
        let first = render(
            &compose(&options).unwrap(),
            Format::Docker,
            options.distro().unwrap(),
        );
        let second = render(
            &compose(&options).unwrap(),
            Format::Docker,
            options.distro().unwrap(),
        );
        assert_eq!(first, second);
    }
}
