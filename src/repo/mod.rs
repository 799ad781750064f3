//! Repository references and pages-site classification.

use std::fmt::{self, Display};

use thiserror::Error;


/// Suffixes that mark a repository as the owner's root published site.
const USER_PAGES_SUFFIXES: [&str; 2] = [".github.io", ".github.com"];

/// Branch that user-pages repositories keep their site sources on.
const USER_PAGES_SOURCE_BRANCH: &str = "deploy";
/// Branch that project repositories keep their site sources on.
const PROJECT_SOURCE_BRANCH: &str = "master";
/// Branch that user-pages repositories publish built output to.
const USER_PAGES_OUTPUT_BRANCH: &str = "master";
/// Branch that project repositories publish built output to.
const PROJECT_OUTPUT_BRANCH: &str = "gh-pages";

/// Errors raised while parsing a repository full name.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RepoRefError {
    /// Raised when the full name is not of the form `owner/name`.
    #[error("repository must be named as owner/name, got '{0}'")]
    Malformed(String),
    /// Raised when the owner half is empty.
    #[error("repository owner is empty")]
    EmptyOwner,
    /// Raised when the name half is empty.
    #[error("repository name is empty")]
    EmptyName,
}

/// A parsed `owner/name` repository reference.
///
/// Both halves are case-preserved and compared case-sensitively against host
/// responses. The reference is immutable once constructed; classification
/// helpers derive the deploy branches and homepage URL used downstream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    /// Parses a `"owner/name"` full name.
    ///
    /// # Errors
    ///
    /// Returns [`RepoRefError`] when the separator is missing, either half is
    /// empty, or the name half contains a further `/`.
    pub fn parse(full_name: &str) -> Result<Self, RepoRefError> {
        let mut halves = full_name.splitn(2, '/');
        let owner = halves.next().unwrap_or_default();
        let Some(name) = halves.next() else {
            return Err(RepoRefError::Malformed(full_name.to_owned()));
        };
        if name.contains('/') {
            return Err(RepoRefError::Malformed(full_name.to_owned()));
        }
        if owner.is_empty() {
            return Err(RepoRefError::EmptyOwner);
        }
        if name.is_empty() {
            return Err(RepoRefError::EmptyName);
        }
        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Account that owns the repository.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name without the owner prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `owner/name` slug used in host API paths.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Whether the repository publishes the owner's root site.
    ///
    /// A repository qualifies only when its name starts with the owner and
    /// ends with one of the host pages suffixes, so `fred/fred.github.io`
    /// qualifies while `fred/barney.github.io` does not.
    #[must_use]
    pub fn is_user_pages(&self) -> bool {
        self.name.starts_with(&self.owner)
            && USER_PAGES_SUFFIXES
                .iter()
                .any(|suffix| self.name.ends_with(suffix))
    }

    /// Branch holding the site sources that CI builds from.
    #[must_use]
    pub fn source_branch(&self) -> &'static str {
        if self.is_user_pages() {
            USER_PAGES_SOURCE_BRANCH
        } else {
            PROJECT_SOURCE_BRANCH
        }
    }

    /// Branch the built site is pushed to.
    #[must_use]
    pub fn output_branch(&self) -> &'static str {
        if self.is_user_pages() {
            USER_PAGES_OUTPUT_BRANCH
        } else {
            PROJECT_OUTPUT_BRANCH
        }
    }

    /// Public URL the published site will be served from.
    #[must_use]
    pub fn homepage(&self) -> String {
        if self.is_user_pages() {
            format!("https://{}.github.io/", self.owner)
        } else {
            format!("https://{}.github.io/{}", self.owner, self.name)
        }
    }
}

impl Display for RepoRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.owner, self.name)
    }
}
