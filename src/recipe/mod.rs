//! Recipe data model
//!
//! A recipe is an ordered sequence of named [`Stage`]s, each stage an ordered
//! sequence of [`Fragment`]s. Fragments are inert, order-sensitive units of
//! recipe text; the composer sequences them and never inspects their
//! contents. Rendering to a concrete dialect lives in [`render`].

pub mod render;

pub use render::render;

use clap::ValueEnum;

use crate::error::SequenceError;

/// Output recipe dialect
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Dockerfile
    Docker,
    /// Singularity definition file
    Singularity,
}

/// Base Linux distribution of the image
///
/// Determines which package manager the package-install fragments render to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    Ubuntu,
    Centos,
}

/// One build instruction
///
/// The four fragment kinds mirror what a multi-stage container build needs:
/// a base image selection, a package install, a shell command batch, and a
/// cross-stage file copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Base image selection, optionally naming the stage for later reference
    BaseImage {
        image: String,
        stage_name: Option<String>,
    },
    /// OS package installation, with optional apt repository vocabulary
    Packages {
        ospackages: Vec<String>,
        apt_ppas: Vec<String>,
        apt_keys: Vec<String>,
        apt_repositories: Vec<String>,
    },
    /// Shell command batch
    Shell { commands: Vec<String> },
    /// File copy, optionally from an earlier stage
    Copy {
        from: Option<String>,
        src: Vec<String>,
        dest: String,
    },
}

impl Fragment {
    /// Base image fragment without a stage name
    pub fn base_image(image: impl Into<String>) -> Self {
        Self::BaseImage {
            image: image.into(),
            stage_name: None,
        }
    }

    /// Base image fragment naming the stage
    pub fn base_image_as(image: impl Into<String>, stage: impl Into<String>) -> Self {
        Self::BaseImage {
            image: image.into(),
            stage_name: Some(stage.into()),
        }
    }

    /// Plain package install with no extra repositories
    pub fn packages<I, S>(ospackages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Packages {
            ospackages: ospackages.into_iter().map(Into::into).collect(),
            apt_ppas: Vec::new(),
            apt_keys: Vec::new(),
            apt_repositories: Vec::new(),
        }
    }

    /// Shell command batch
    pub fn shell<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Shell {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Copy from an earlier stage
    pub fn copy_from(
        stage: impl Into<String>,
        src: impl Into<String>,
        dest: impl Into<String>,
    ) -> Self {
        Self::Copy {
            from: Some(stage.into()),
            src: vec![src.into()],
            dest: dest.into(),
        }
    }
}

/// A named, ordered unit of build instructions
///
/// A stage may be referenced by later stages for file extraction; only the
/// final stage of the sequence is retained as the output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    name: String,
    fragments: Vec<Fragment>,
}

impl Stage {
    /// Create an empty stage
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragments: Vec::new(),
        }
    }

    /// Stage name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append one fragment
    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Append a batch of fragments, preserving their order
    pub fn extend<I: IntoIterator<Item = Fragment>>(&mut self, fragments: I) {
        self.fragments.extend(fragments);
    }

    /// Fragments in append order
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Names of stages this stage copies files from
    pub fn copy_sources(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Copy {
                from: Some(from), ..
            } => Some(from.as_str()),
            _ => None,
        })
    }
}

/// Insertion-ordered sequence of stages
///
/// Insertion order is emission order. A stage may only copy from stages
/// already in the sequence; forward references are rejected at insertion
/// time so a sequencing bug in the composer surfaces before any output.
#[derive(Debug, Default)]
pub struct StageSequence {
    stages: Vec<Stage>,
}

impl StageSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a stage with this name is already in the sequence
    pub fn contains(&self, name: &str) -> bool {
        self.stages.iter().any(|s| s.name() == name)
    }

    /// Append a stage, validating its cross-stage copy references
    pub fn push(&mut self, stage: Stage) -> Result<(), SequenceError> {
        for from in stage.copy_sources() {
            if !self.contains(from) {
                return Err(SequenceError::ForwardStageReference {
                    stage: stage.name().to_string(),
                    from: from.to_string(),
                });
            }
        }
        self.stages.push(stage);
        Ok(())
    }

    /// Stages in emission order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if the sequence holds no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut seq = StageSequence::new();
        seq.push(Stage::new("tsan")).unwrap();
        seq.push(Stage::new("main")).unwrap();

        let names: Vec<&str> = seq.stages().iter().map(Stage::name).collect();
        assert_eq!(names, ["tsan", "main"]);
    }

    #[test]
    fn test_copy_from_earlier_stage_is_accepted() {
        let mut seq = StageSequence::new();
        seq.push(Stage::new("pyenv")).unwrap();

        let mut main = Stage::new("main");
        main.push(Fragment::copy_from("pyenv", "/root/venv/", "/root/venv"));
        assert!(seq.push(main).is_ok());
    }

    #[test]
    fn test_forward_reference_is_rejected() {
        let mut seq = StageSequence::new();
        let mut main = Stage::new("main");
        main.push(Fragment::copy_from("pyenv", "/root/venv/", "/root/venv"));

        let err = seq.push(main).unwrap_err();
        assert!(matches!(
            err,
            SequenceError::ForwardStageReference { ref from, .. } if from == "pyenv"
        ));
        // The failed push must not leave a partial stage behind
        assert!(seq.is_empty());
    }
}
