//! Contents of the configuration files committed to the target repository.
//!
//! Both artifacts are fixed templates parameterized by the repository
//! reference and committed verbatim; the CI host executes the script inside
//! its own build sandbox.

use crate::repo::RepoRef;
use crate::source::{CommitAuthor, FileSpec};

/// Path of the build-and-deploy script inside the target repository.
pub const SCRIPT_PATH: &str = "travis_build_n_deploy.sh";
/// Path of the CI manifest inside the target repository.
pub const MANIFEST_PATH: &str = ".travis.yml";

fn commit_message(path: &str) -> String {
    format!("Adding {path} (from deckhand).")
}

/// Builds the file spec for the build-and-deploy script.
#[must_use]
pub(crate) fn script_spec(repo: &RepoRef, author: &CommitAuthor) -> FileSpec {
    FileSpec {
        path: SCRIPT_PATH.to_owned(),
        content: script_contents(repo).into_bytes(),
        message: commit_message(SCRIPT_PATH),
        author: author.clone(),
        branch: Some(repo.source_branch().to_owned()),
    }
}

/// Builds the file spec for the CI manifest embedding the sealed value.
#[must_use]
pub(crate) fn manifest_spec(repo: &RepoRef, author: &CommitAuthor, sealed: &str) -> FileSpec {
    FileSpec {
        path: MANIFEST_PATH.to_owned(),
        content: manifest_contents(repo, sealed).into_bytes(),
        message: commit_message(MANIFEST_PATH),
        author: author.clone(),
        branch: Some(repo.source_branch().to_owned()),
    }
}

/// Renders the build-and-deploy script for the repository.
///
/// The script runs inside the CI sandbox with `GITHUB_TOKEN`, `GIT_NAME`,
/// and `GIT_EMAIL` provided by the sealed environment. It populates a demo
/// site on first run, builds, and force-pushes the output branch.
#[must_use]
pub(crate) fn script_contents(repo: &RepoRef) -> String {
    format!(
        r#"#!/bin/bash
set -e

REPO="{repo}"
SOURCE_BRANCH="{source_branch}"
OUTPUT_BRANCH="{output_branch}"

if [ "${{TRAVIS_PULL_REQUEST}}" != "false" ]; then
    echo "Not deploying pull request builds."
    exit 0
fi

git config user.name "${{GIT_NAME}}"
git config user.email "${{GIT_EMAIL}}"
git remote set-url --push origin "https://${{GITHUB_TOKEN}}@github.com/${{REPO}}.git"

# First build of an empty repository: populate the source branch with a demo
# site before anything else.
if [ ! -f conf.py ]; then
    git checkout -B "${{SOURCE_BRANCH}}"
    nikola init --demo demo
    mv demo/* .
    rm -rf demo
    mkdir -p files
    touch files/.nojekyll
    git add -A
    git commit -m "Initial demo site (from deckhand)."
    git push origin "${{SOURCE_BRANCH}}:${{SOURCE_BRANCH}}"
fi

# Build twice; incremental state settles on the second pass.
nikola build && nikola build

git branch -D "${{OUTPUT_BRANCH}}" || true
git checkout --orphan "${{OUTPUT_BRANCH}}"
ls | grep -v output | xargs rm -rf
mv output/* .
rm -rf output
git add -A
git commit -m "Built site ($(date))"
git push -f origin "${{OUTPUT_BRANCH}}:${{OUTPUT_BRANCH}}"
"#,
        repo = repo.full_name(),
        source_branch = repo.source_branch(),
        output_branch = repo.output_branch(),
    )
}

/// Renders the CI manifest with the sealed environment value.
#[must_use]
pub(crate) fn manifest_contents(repo: &RepoRef, sealed: &str) -> String {
    format!(
        r#"language: python
python:
  - '2.7'
branches:
  only:
    - {source_branch}
env:
  global:
    secure: "{sealed}"
install:
  - wget https://github.com/getnikola/wheelhouse/archive/v2.7.zip
  - unzip v2.7.zip
  - pip install --use-wheel --no-index --find-links=wheelhouse-2.7 lxml Pillow
  - rm -rf wheelhouse-2.7 v2.7.zip
  - pip install nikola webassets
script: bash {script_path}
"#,
        source_branch = repo.source_branch(),
        sealed = sealed,
        script_path = SCRIPT_PATH,
    )
}
