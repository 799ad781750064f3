//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::provision::ProvisionIdentity;
use crate::source::CommitAuthor;

/// Deckhand configuration derived from environment variables, configuration
/// files, and CLI flags.
///
/// Defaults point at the public GitHub and Travis CI endpoints; overrides
/// exist mainly for integration environments.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "DECKHAND")]
pub struct DeckhandConfig {
    /// Root of the source-host REST API.
    #[ortho_config(default = "https://api.github.com".to_owned())]
    pub github_api_root: String,
    /// Status page scraped for the informational source-host status line.
    #[ortho_config(default = "https://status.github.com".to_owned())]
    pub github_status_url: String,
    /// Root of the CI-host REST API.
    #[ortho_config(default = "https://api.travis-ci.org".to_owned())]
    pub travis_api_root: String,
    /// Status page scraped for the informational CI-host status line.
    #[ortho_config(default = "https://status.travis-ci.com".to_owned())]
    pub travis_status_url: String,
    /// Name recorded as author and committer on configuration commits.
    #[ortho_config(default = "deckhand".to_owned())]
    pub commit_author_name: String,
    /// Email recorded as author and committer on configuration commits.
    #[ortho_config(default = "deckhand@users.noreply.github.com".to_owned())]
    pub commit_author_email: String,
    /// Git author name the CI build uses for deploy commits.
    #[ortho_config(default = "Travis CI".to_owned())]
    pub ci_git_name: String,
    /// Git author email the CI build uses for deploy commits.
    #[ortho_config(default = "testing@travis-ci.org".to_owned())]
    pub ci_git_email: String,
}

/// Metadata for a configuration field, used to generate actionable error
/// messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl DeckhandConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to deckhand.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags
    /// in that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("deckhand")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages
    /// include guidance on how to provide missing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            (
                self.github_api_root.as_str(),
                FieldMetadata {
                    description: "source host API root",
                    env_var: "DECKHAND_GITHUB_API_ROOT",
                    toml_key: "github_api_root",
                },
            ),
            (
                self.travis_api_root.as_str(),
                FieldMetadata {
                    description: "CI host API root",
                    env_var: "DECKHAND_TRAVIS_API_ROOT",
                    toml_key: "travis_api_root",
                },
            ),
            (
                self.commit_author_name.as_str(),
                FieldMetadata {
                    description: "commit author name",
                    env_var: "DECKHAND_COMMIT_AUTHOR_NAME",
                    toml_key: "commit_author_name",
                },
            ),
            (
                self.commit_author_email.as_str(),
                FieldMetadata {
                    description: "commit author email",
                    env_var: "DECKHAND_COMMIT_AUTHOR_EMAIL",
                    toml_key: "commit_author_email",
                },
            ),
            (
                self.ci_git_name.as_str(),
                FieldMetadata {
                    description: "CI git author name",
                    env_var: "DECKHAND_CI_GIT_NAME",
                    toml_key: "ci_git_name",
                },
            ),
            (
                self.ci_git_email.as_str(),
                FieldMetadata {
                    description: "CI git author email",
                    env_var: "DECKHAND_CI_GIT_EMAIL",
                    toml_key: "ci_git_email",
                },
            ),
        ];
        for (value, metadata) in &fields {
            Self::require_field(value, metadata)?;
        }
        Ok(())
    }

    /// Builds the identities used by the provisioner from this configuration.
    #[must_use]
    pub fn identity(&self) -> ProvisionIdentity {
        ProvisionIdentity {
            commit_author: CommitAuthor {
                name: self.commit_author_name.clone(),
                email: self.commit_author_email.clone(),
            },
            ci_git_name: self.ci_git_name.clone(),
            ci_git_email: self.ci_git_email.clone(),
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
