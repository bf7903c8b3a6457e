//! Versioned CMake installs
//!
//! Each requested CMake version is installed from the prebuilt Kitware
//! installer into a version-qualified prefix, so any number of versions can
//! coexist in one image.

use crate::config::urls;
use crate::recipe::Fragment;

/// Fragment installing one CMake version under `prefix`
pub fn cmake(version: &str, prefix: &str) -> Fragment {
    let installer = format!("cmake-{version}-linux-x86_64.sh");
    let url = format!("{}/v{version}/{installer}", urls::CMAKE_RELEASES);
    Fragment::shell([
        format!("mkdir -p /var/tmp && wget -q -nc -P /var/tmp {url}"),
        format!("mkdir -p {prefix}"),
        format!("/bin/sh /var/tmp/{installer} --prefix={prefix} --skip-license"),
        format!("rm -rf /var/tmp/{installer}"),
    ])
}

/// Version-qualified install prefix for one CMake version
pub fn versioned_prefix(version: &str) -> String {
    format!("/usr/local/cmake-{version}")
}
