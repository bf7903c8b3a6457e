//! Generic source builds
//!
//! Fragment producers for components that have to be compiled from a git
//! checkout: a CMake-driven build and an autotools-driven build. Both clone
//! into `/var/tmp`, build, install, and remove the checkout again so only
//! the install prefix stays in the image layer.

use crate::recipe::Fragment;

/// CMake-driven source build of a git repository
#[derive(Debug, Clone)]
pub struct CmakeSourceBuild {
    repository: String,
    prefix: String,
    branch: Option<String>,
    commit: Option<String>,
    source_subdir: Option<String>,
    recursive: bool,
    cmake_opts: Vec<String>,
    postinstall: Vec<String>,
}

impl CmakeSourceBuild {
    pub fn new(repository: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            prefix: prefix.into(),
            branch: None,
            commit: None,
            source_subdir: None,
            recursive: false,
            cmake_opts: Vec::new(),
            postinstall: Vec::new(),
        }
    }

    /// Check out a branch after cloning
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Check out a specific commit after cloning
    pub fn commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    /// Configure from a subdirectory of the checkout instead of its root
    pub fn source_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.source_subdir = Some(subdir.into());
        self
    }

    /// Clone submodules as well
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Additional `-D` options passed to the configure step
    pub fn cmake_opts<I, S>(mut self, opts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmake_opts = opts.into_iter().map(Into::into).collect();
        self
    }

    /// Shell commands run after `cmake --target install`
    pub fn postinstall<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.postinstall = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Produce the shell fragment for this build
    pub fn fragment(&self) -> Fragment {
        let name = repository_name(&self.repository);
        let clone_dir = format!("/var/tmp/{name}");
        let source_dir = match &self.source_subdir {
            Some(subdir) => format!("{clone_dir}/{subdir}"),
            None => clone_dir.clone(),
        };

        let mut commands = vec![clone_command(
            &self.repository,
            &name,
            self.recursive,
            self.branch.as_deref(),
        )];
        if let Some(commit) = &self.commit {
            commands.push(format!("cd {clone_dir} && git checkout {commit}"));
        }
        let mut configure = format!(
            "mkdir -p {clone_dir}/build && cd {clone_dir}/build && \
             cmake -DCMAKE_INSTALL_PREFIX={}",
            self.prefix
        );
        for opt in &self.cmake_opts {
            configure.push(' ');
            configure.push_str(opt);
        }
        configure.push(' ');
        configure.push_str(&source_dir);
        commands.push(configure);
        commands.push(format!(
            "cmake --build {clone_dir}/build --target all -- -j$(nproc)"
        ));
        commands.push(format!("cmake --build {clone_dir}/build --target install"));
        commands.extend(self.postinstall.iter().cloned());
        commands.push(format!("rm -rf {clone_dir}"));

        Fragment::shell(commands)
    }
}

/// Autotools-driven source build of a git repository
#[derive(Debug, Clone)]
pub struct AutotoolsSourceBuild {
    repository: String,
    prefix: String,
    commit: Option<String>,
    preconfigure: Vec<String>,
    configure_opts: Vec<String>,
}

impl AutotoolsSourceBuild {
    /// An empty `prefix` leaves the configure script's default prefix alone.
    pub fn new(repository: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            prefix: prefix.into(),
            commit: None,
            preconfigure: Vec::new(),
            configure_opts: Vec::new(),
        }
    }

    /// Check out a specific commit after cloning
    pub fn commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    /// Shell commands run in the checkout before `./configure`
    pub fn preconfigure<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preconfigure = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Options appended to the `./configure` invocation
    pub fn configure_opts<I, S>(mut self, opts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configure_opts = opts.into_iter().map(Into::into).collect();
        self
    }

    /// Produce the shell fragment for this build
    pub fn fragment(&self) -> Fragment {
        let name = repository_name(&self.repository);
        let clone_dir = format!("/var/tmp/{name}");

        let mut commands = vec![clone_command(&self.repository, &name, false, None)];
        if let Some(commit) = &self.commit {
            commands.push(format!("cd {clone_dir} && git checkout {commit}"));
        }
        for command in &self.preconfigure {
            commands.push(format!("cd {clone_dir} && {command}"));
        }
        let mut configure = format!("cd {clone_dir} && ./configure");
        if !self.prefix.is_empty() {
            configure.push_str(&format!(" --prefix={}", self.prefix));
        }
        for opt in &self.configure_opts {
            configure.push(' ');
            configure.push_str(opt);
        }
        commands.push(configure);
        commands.push(format!("cd {clone_dir} && make -j$(nproc)"));
        commands.push(format!("cd {clone_dir} && make install"));
        commands.push(format!("rm -rf {clone_dir}"));

        Fragment::shell(commands)
    }
}

fn clone_command(repository: &str, name: &str, recursive: bool, branch: Option<&str>) -> String {
    let mut command = String::from("mkdir -p /var/tmp && cd /var/tmp && git clone");
    if recursive {
        command.push_str(" --recursive");
    }
    if let Some(branch) = branch {
        command.push_str(&format!(" -b {branch}"));
    }
    command.push_str(&format!(" {repository} {name}"));
    command
}

/// Directory name a `git clone` of this URL produces
fn repository_name(repository: &str) -> String {
    repository
        .rsplit('/')
        .next()
        .unwrap_or(repository)
        .trim_end_matches(".git")
        .to_string()
}
