//! Errors raised while listing an account's repositories.
//!
//! Every variant is fatal for a backup run: a page that could not be read
//! would silently hide the repositories behind it.

/// Failure of the repository listing.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// The API answered 404 for the account's repository list.
    #[error("no such GitHub user found: {account}")]
    AccountNotFound { account: String },

    /// Any other non-success HTTP status.
    #[error("calling GitHub API failed with HTTP status code {status}")]
    Api { status: u16 },

    #[error("request to GitHub API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode repository page {page}: {source}")]
    Decode {
        page: u32,
        #[source]
        source: serde_json::Error,
    },
}
