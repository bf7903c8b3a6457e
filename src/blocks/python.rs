//! Python interpreter installs

use crate::recipe::Fragment;

/// Default Python 3 install from the distribution repositories
pub fn python3(devel: bool) -> Fragment {
    let mut ospackages = vec!["python3".to_string()];
    if devel {
        ospackages.push("python3-dev".to_string());
        ospackages.push("python3-pip".to_string());
    }
    Fragment::packages(ospackages)
}

/// Shell fragment guaranteeing that `python` resolves to something
pub fn ensure_default_python() -> Fragment {
    Fragment::shell([
        "test -x /usr/bin/python || \
         update-alternatives --install /usr/bin/python python /usr/bin/python3 1 && \
         /usr/bin/python --version",
    ])
}
