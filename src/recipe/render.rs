//! Recipe serialization
//!
//! Renders a [`StageSequence`] to one of the two supported dialects. The
//! rendering is deterministic: identical sequences always produce
//! byte-identical text.

use super::{Distro, Format, Fragment, Stage, StageSequence};

/// Serialize a full stage sequence in the selected dialect
pub fn render(sequence: &StageSequence, format: Format, distro: Distro) -> String {
    let mut out = sequence
        .stages()
        .iter()
        .map(|stage| render_stage(stage, format, distro))
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

fn render_stage(stage: &Stage, format: Format, distro: Distro) -> String {
    stage
        .fragments()
        .iter()
        .map(|fragment| render_fragment(fragment, format, distro))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_fragment(fragment: &Fragment, format: Format, distro: Distro) -> String {
    match fragment {
        Fragment::BaseImage { image, stage_name } => match format {
            Format::Docker => match stage_name {
                Some(name) => format!("FROM {image} AS {name}"),
                None => format!("FROM {image}"),
            },
            Format::Singularity => {
                let mut out = format!("Bootstrap: docker\nFrom: {image}");
                if let Some(name) = stage_name {
                    out.push_str(&format!("\nStage: {name}"));
                }
                out
            }
        },
        Fragment::Packages {
            ospackages,
            apt_ppas,
            apt_keys,
            apt_repositories,
        } => {
            let commands =
                package_commands(distro, ospackages, apt_ppas, apt_keys, apt_repositories);
            render_commands(&commands, format)
        }
        Fragment::Shell { commands } => render_commands(commands, format),
        Fragment::Copy { from, src, dest } => match format {
            Format::Docker => {
                let sources = src.join(" ");
                match from {
                    Some(stage) => format!("COPY --from={stage} {sources} {dest}"),
                    None => format!("COPY {sources} {dest}"),
                }
            }
            Format::Singularity => {
                let header = match from {
                    Some(stage) => format!("%files from {stage}"),
                    None => "%files".to_string(),
                };
                let lines: Vec<String> =
                    src.iter().map(|s| format!("    {s} {dest}")).collect();
                format!("{header}\n{}", lines.join("\n"))
            }
        },
    }
}

/// Render a command batch as a `RUN` directive or a `%post` section
fn render_commands(commands: &[String], format: Format) -> String {
    match format {
        Format::Docker => format!("RUN {}", commands.join(" && \\\n    ")),
        Format::Singularity => {
            let mut out = String::from("%post\n    cd /");
            for command in commands {
                out.push_str("\n    ");
                out.push_str(command);
            }
            out
        }
    }
}

/// Expand a package-install fragment into shell commands for the distro
///
/// The apt PPA/key/repository vocabulary only applies to Debian-based
/// images; on CentOS the packages are installed with yum and the apt fields
/// are ignored.
fn package_commands(
    distro: Distro,
    ospackages: &[String],
    apt_ppas: &[String],
    apt_keys: &[String],
    apt_repositories: &[String],
) -> Vec<String> {
    match distro {
        Distro::Ubuntu => {
            let mut commands = vec!["apt-get update -y".to_string()];
            let has_repos =
                !apt_ppas.is_empty() || !apt_keys.is_empty() || !apt_repositories.is_empty();
            if has_repos {
                commands.push(
                    "apt-get install -y --no-install-recommends \
                     apt-transport-https ca-certificates gnupg software-properties-common wget"
                        .to_string(),
                );
                for ppa in apt_ppas {
                    commands.push(format!("add-apt-repository -y {ppa}"));
                }
                for key in apt_keys {
                    commands.push(format!("wget -qO - {key} | apt-key add -"));
                }
                for repo in apt_repositories {
                    commands.push(format!(
                        "echo \"{repo}\" >> /etc/apt/sources.list.d/cibake.list"
                    ));
                }
                commands.push("apt-get update -y".to_string());
            }
            if !ospackages.is_empty() {
                commands.push(format!(
                    "DEBIAN_FRONTEND=noninteractive apt-get install -y --no-install-recommends {}",
                    ospackages.join(" ")
                ));
            }
            commands.push("rm -rf /var/lib/apt/lists/*".to_string());
            commands
        }
        Distro::Centos => {
            let mut commands = Vec::new();
            if !ospackages.is_empty() {
                commands.push(format!("yum install -y {}", ospackages.join(" ")));
            }
            commands.push("rm -rf /var/cache/yum/*".to_string());
            commands
        }
    }
}
