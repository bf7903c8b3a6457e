//! OpenMPI source build
//!
//! Builds OpenMPI from a release tarball with the resolved compiler
//! toolchain. InfiniBand support is disabled; CUDA awareness follows the
//! recipe's CUDA selection.

use super::compiler::Toolchain;
use crate::config::{defaults, urls};
use crate::recipe::Fragment;

/// Fragments building OpenMPI into its own prefix
pub fn openmpi(toolchain: &Toolchain, cuda: bool) -> Vec<Fragment> {
    let version = defaults::OPENMPI_VERSION;
    let prefix = defaults::OPENMPI_PREFIX;
    let series = version_series(version);
    let tarball = format!("openmpi-{version}.tar.bz2");
    let url = format!("{}/v{series}/downloads/{tarball}", urls::OPENMPI_DOWNLOADS);
    let cuda_opt = if cuda { "--with-cuda" } else { "--without-cuda" };

    let build = Fragment::shell([
        format!("mkdir -p /var/tmp && wget -q -nc --no-check-certificate -P /var/tmp {url}"),
        format!("tar -x -f /var/tmp/{tarball} -C /var/tmp -j"),
        format!(
            "cd /var/tmp/openmpi-{version} && CC={cc} CXX={cxx} ./configure \
             --prefix={prefix} --disable-getpwuid --disable-verbs {cuda_opt}",
            cc = toolchain.cc,
            cxx = toolchain.cxx,
        ),
        format!("cd /var/tmp/openmpi-{version} && make -j$(nproc)"),
        format!("cd /var/tmp/openmpi-{version} && make -j$(nproc) install"),
        format!("rm -rf /var/tmp/openmpi-{version} /var/tmp/{tarball}"),
        format!("echo \"{prefix}/lib\" >> /etc/ld.so.conf.d/openmpi.conf && ldconfig"),
        format!("echo 'export PATH={prefix}/bin:$PATH' >> /etc/bash.bashrc"),
    ]);

    vec![
        Fragment::packages([
            "bzip2",
            "file",
            "hwloc",
            "libnuma-dev",
            "make",
            "openssh-client",
            "perl",
            "tar",
            "wget",
        ]),
        build,
    ]
}

/// Release series directory for a version, e.g. `4.0.5` -> `4.0`
fn version_series(version: &str) -> String {
    version
        .split('.')
        .take(2)
        .collect::<Vec<_>>()
        .join(".")
}
