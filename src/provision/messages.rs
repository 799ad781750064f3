//! User-facing guidance texts for terminal provisioning states.

use super::outcome::UserMessage;
use crate::repo::RepoRef;

/// Renders the guidance text for a terminal state.
///
/// The repository is optional because validation failures happen before a
/// reference exists; categories that mention the published site fall back to
/// generic wording without one.
#[must_use]
pub fn render(message: UserMessage, repo: Option<&RepoRef>) -> String {
    match message {
        UserMessage::Done => format!(
            "Congratulations! Your site will be published to {} in a few \
             minutes. Grab a cup of coffee while the internet works for you!",
            homepage_or_generic(repo)
        ),
        UserMessage::OnlyHookEnabled => format!(
            "Only the CI integration was completed; the configuration files \
             were not committed. Do they already exist? If so, your site \
             should still be published to {} in a few minutes. Otherwise, \
             try submitting your request again.",
            homepage_or_generic(repo)
        ),
        UserMessage::OnlyFilesCommitted => {
            "The configuration files were committed, but the build hook could \
             not be enabled. Enable it from your Travis CI profile and push \
             any commit to trigger the first build."
                .to_owned()
        }
        UserMessage::TotalFailure => {
            "Failed to set up the CI integration or commit the required \
             files. This is a total failure! Try resubmitting your request, \
             or get in touch with us."
                .to_owned()
        }
        UserMessage::InvalidRepository => {
            "Need a valid repository name of the form owner/name.".to_owned()
        }
        UserMessage::UnsupportedOwner => {
            "Creating repositories owned by an organization is not supported."
                .to_owned()
        }
        UserMessage::RepoCreationFailed => {
            "Failed to create your repository. Try again, or get in touch \
             with us!"
                .to_owned()
        }
        UserMessage::NoCiAccount => {
            "Please sign up for a Travis CI account to proceed. If you have \
             just signed up, wait for Travis to sync your repositories from \
             GitHub."
                .to_owned()
        }
        UserMessage::ProjectNotFound => {
            "The repository could not be found on Travis CI. Run a sync \
             manually from your Travis profile and try again."
                .to_owned()
        }
        UserMessage::SyncUnconfirmed => {
            "Could not confirm that Travis CI finished syncing your \
             repositories. Try again in a few minutes."
                .to_owned()
        }
        UserMessage::DeadlineExceeded => {
            "Provisioning did not finish before the deadline. Try again."
                .to_owned()
        }
        UserMessage::HostUnreachable => {
            "A host could not be reached. Check the service status and try \
             again."
                .to_owned()
        }
    }
}

fn homepage_or_generic(repo: Option<&RepoRef>) -> String {
    repo.map_or_else(|| "its homepage".to_owned(), RepoRef::homepage)
}
