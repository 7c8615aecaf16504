//! # dpp-cli — Desh Passport Portal CLI
//!
//! Provides the `dpp` command line tool, a thin HTTP client over a running
//! `dpp-api` instance.
//!
//! ## Subcommands
//!
//! - `dpp track` — Anonymous tracking by application number plus date of birth.
//! - `dpp applications list` — Table of the caller's applications.
//! - `dpp applications status` — Officer status update.
//! - `dpp applications export` — JSON dump of the caller's applications.
//!
//! ## Connection settings
//!
//! The API address and bearer token come from `--api-url` / `--token` or
//! the `DPP_API_URL` / `DPP_API_TOKEN` environment variables. Anonymous
//! tracking works without a token; the other subcommands need one unless
//! the server runs with authentication disabled.

pub mod applications;
pub mod client;
pub mod track;

#[cfg(test)]
mod tests {
    #[test]
    fn public_modules_are_accessible() {
        // Verify that the public module surface compiles.
        let _ = std::any::type_name::<crate::applications::ApplicationsArgs>();
        let _ = std::any::type_name::<crate::client::PortalClient>();
        let _ = std::any::type_name::<crate::track::TrackArgs>();
    }
}
