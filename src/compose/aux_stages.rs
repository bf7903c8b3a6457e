//! Auxiliary build stages
//!
//! Stages that exist only to produce artifacts a later stage copies out:
//! the TSAN compiler build, the oneAPI toolkit install, and the per-version
//! Python venv stages with their collector. Each builder returns the
//! stage(s) it creates; merging them into the sequence is the composer's
//! job, so no shared mutable stage container is passed around.

use semver::Version;

use crate::blocks::compiler::{ONEAPI_STAGE, TSAN_STAGE};
use crate::blocks::{python, source::CmakeSourceBuild};
use crate::config::{defaults, urls};
use crate::error::ConfigError;
use crate::recipe::{Fragment, Stage};

use super::options::BuildOptions;

/// Name of the venv collector stage
pub const PYENV_STAGE: &str = "pyenv";

/// Isolated TSAN compiler build stage
///
/// This is a very expensive stage, but it has few and disjoint dependencies
/// and its output is compartmentalized under /usr/local, so isolating it
/// maximizes build cache hits and keeps the final image small. Only the
/// packages strictly required to build LLVM go in; the CMake install is
/// duplicated with the main stage, which is cheaper than coupling the two.
pub fn tsan_build_stage(
    options: &BuildOptions,
    llvm_version: &str,
) -> Result<Stage, ConfigError> {
    let mut stage = Stage::new(TSAN_STAGE);
    stage.push(Fragment::base_image_as(options.base_image_tag()?, TSAN_STAGE));
    stage.push(Fragment::packages([
        "git",
        "ca-certificates",
        "build-essential",
        "cmake",
    ]));
    stage.push(python::python3(false));

    let branch = format!("release/{llvm_version}.x");
    stage.push(
        CmakeSourceBuild::new(urls::LLVM_PROJECT_REPO, "/usr/local")
            .recursive()
            .branch(branch)
            .source_subdir("llvm")
            .cmake_opts([
                "-D CMAKE_BUILD_TYPE=Release",
                "-D LLVM_ENABLE_PROJECTS=\"clang;openmp;clang-tools-extra;compiler-rt;lld\"",
                "-D LIBOMP_TSAN_SUPPORT=on",
            ])
            .postinstall([
                format!("ln -s /usr/local/bin/clang++ /usr/local/bin/clang++-{llvm_version}"),
                format!(
                    "ln -s /usr/local/bin/clang-format /usr/local/bin/clang-format-{llvm_version}"
                ),
                format!(
                    "ln -s /usr/local/bin/clang-tidy /usr/local/bin/clang-tidy-{llvm_version}"
                ),
                format!(
                    "ln -s /usr/local/share/clang/run-clang-tidy.py \
                     /usr/local/bin/run-clang-tidy-{llvm_version}.py"
                ),
                format!(
                    "ln -s /usr/local/bin/run-clang-tidy-{llvm_version}.py \
                     /usr/local/bin/run-clang-tidy-{llvm_version}"
                ),
                format!(
                    "ln -s /usr/local/libexec/c++-analyzer \
                     /usr/local/bin/c++-analyzer-{llvm_version}"
                ),
            ])
            .fragment(),
    );
    Ok(stage)
}

/// Isolated oneAPI toolkit install stage
///
/// Isolated so that only /opt/intel and the environment setup reach the
/// final image, not the apt repository plumbing. Installs the minimal
/// component set, not the whole HPC toolkit.
pub fn oneapi_build_stage(options: &BuildOptions, version: &str) -> Result<Stage, ConfigError> {
    let mut stage = Stage::new(ONEAPI_STAGE);
    stage.push(Fragment::base_image_as(
        options.base_image_tag()?,
        ONEAPI_STAGE,
    ));
    stage.push(Fragment::packages([
        "wget",
        "gnupg2",
        "ca-certificates",
        "lsb-release",
    ]));
    stage.push(Fragment::Packages {
        ospackages: vec![
            format!("intel-oneapi-dpcpp-cpp-{version}"),
            format!("intel-oneapi-openmp-{version}"),
            format!("intel-oneapi-mkl-{version}"),
            format!("intel-oneapi-mkl-devel-{version}"),
        ],
        apt_ppas: Vec::new(),
        apt_keys: vec![urls::INTEL_APT_KEY.to_string()],
        apt_repositories: vec![urls::INTEL_APT_REPO.to_string()],
    });
    // All bash shells on the final container get access to oneAPI, and
    // compiler/latest points at the requested version.
    stage.push(Fragment::shell([
        "echo \"source /opt/intel/oneapi/setvars.sh\" >> /etc/bash.bashrc".to_string(),
        "unlink /opt/intel/oneapi/compiler/latest".to_string(),
        format!("ln -sf /opt/intel/oneapi/compiler/{version} /opt/intel/oneapi/compiler/latest"),
    ]));
    Ok(stage)
}

/// Per-version Python venv stages plus their collector, in emission order
///
/// One stage per requested interpreter version builds that interpreter with
/// pyenv and populates a venv in the home directory. The collector stage
/// copies every home directory tree, so the main stage can pull the
/// aggregate in a single copy per tree rather than one per version.
pub fn python_stages(
    options: &BuildOptions,
    compiler: &[Fragment],
    mpi: &[Fragment],
) -> Result<Vec<Stage>, ConfigError> {
    let versions = options.sorted_venvs()?;
    if versions.is_empty() {
        return Err(ConfigError::NoVenvVersions);
    }

    let base_image = options.base_image_tag()?;
    let mut stages = Vec::with_capacity(versions.len() + 1);

    let mut collector = Stage::new(PYENV_STAGE);
    collector.push(Fragment::base_image_as(&base_image, PYENV_STAGE));
    collector.extend(compiler.iter().cloned());
    collector.extend(mpi.iter().cloned());
    collector.push(Fragment::packages(
        defaults::PYTHON_EXTRA_PACKAGES.iter().copied(),
    ));

    for version in &versions {
        let stage_name = format!("py{version}");
        let mut stage = Stage::new(&stage_name);
        stage.push(Fragment::base_image_as(&base_image, &stage_name));
        stage.extend(compiler.iter().cloned());
        stage.extend(mpi.iter().cloned());
        stage.push(Fragment::packages(
            defaults::PYTHON_EXTRA_PACKAGES.iter().copied(),
        ));
        stage.push(pyenv_bootstrap());
        stage.push(Fragment::shell([format!(
            "PYTHON_CONFIGURE_OPTS=\"--enable-shared\" $HOME/.pyenv/bin/pyenv install -s {version}"
        )]));
        stage.push(Fragment::shell(venv_commands(version)));

        collector.push(Fragment::copy_from(&stage_name, "/root/", "/root"));
        stages.push(stage);
    }

    stages.push(collector);
    Ok(stages)
}

/// Install pyenv and activate it for login shells
fn pyenv_bootstrap() -> Fragment {
    Fragment::shell([
        format!("curl {} | bash", urls::PYENV_INSTALLER),
        "echo 'export PYENV_ROOT=\"$HOME/.pyenv\"' >> $HOME/.bashrc".to_string(),
        "echo 'export PATH=\"$PYENV_ROOT/bin:$PATH\"' >> $HOME/.bashrc".to_string(),
        "echo 'eval \"$(pyenv init -)\"' >> $HOME/.bashrc".to_string(),
        "echo 'eval \"$(pyenv virtualenv-init -)\"' >> $HOME/.bashrc".to_string(),
    ])
}

/// Shell commands that create and populate the venv for one interpreter
fn venv_commands(version: &Version) -> Vec<String> {
    let py_ver = format!("{}.{}", version.major, version.minor);
    let pyenv = "$HOME/.pyenv/bin/pyenv";
    let venv_path = format!("$HOME/venv/py{py_ver}");

    let requirements = defaults::VENV_REQUIREMENTS
        .iter()
        .map(|r| format!("'{r}'"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut commands = vec![
        format!(
            "$({pyenv} prefix `{pyenv} whence python{py_ver}`)/bin/python -m venv {venv_path}"
        ),
        format!("{venv_path}/bin/python -m pip install --upgrade pip setuptools"),
        format!("{venv_path}/bin/python -m pip install --upgrade {requirements}"),
    ];
    // Backport needed only on the oldest supported minor version.
    if version.minor == defaults::IMPORTLIB_COMPAT_MINOR {
        commands.push(format!(
            "{venv_path}/bin/python -m pip install --upgrade 'importlib_resources'"
        ));
    }
    commands
}
