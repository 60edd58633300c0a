use crate::api::{FetchError, ProfileClient};
use crate::config::ScanConfig;
use crate::models::ProfileSnapshot;
use crate::output::{print_fetch_error, print_posts, print_profile, Layout};
use std::io::{self, Write};
use tracing::debug;

/// Looks up `username` and prints the profile report.
///
/// Every lookup failure is reported on `out` and turned into `Ok(None)`; only
/// write errors on `out` itself come back as `Err`.
pub async fn user_info<W: Write>(
    config: &ScanConfig,
    username: &str,
    verbose: bool,
    out: &mut W,
) -> io::Result<Option<ProfileSnapshot>> {
    writeln!(out, "Looking up @{} ...", username)?;

    let result = match ProfileClient::new(config.clone()) {
        Ok(client) => client.fetch_profile(username).await,
        Err(err) => Err(FetchError::Unexpected(err)),
    };

    match result {
        Ok(profile) => {
            debug!(username, posts = profile.posts.len(), "profile loaded");
            print_profile(out, &profile, verbose)?;
            Ok(Some(profile))
        }
        Err(err) => {
            debug!(
                username,
                error = %err,
                body_bytes = err.body().map(str::len),
                "profile lookup failed"
            );
            print_fetch_error(out, &err, verbose)?;
            Ok(None)
        }
    }
}

/// Prints the recent posts carried by an already fetched snapshot.
pub fn post_info<W: Write>(
    profile: &ProfileSnapshot,
    verbose: bool,
    layout: Layout,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out)?;
    print_posts(out, profile, verbose, layout)
}
