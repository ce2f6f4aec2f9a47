#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Plain-text rendering of session state and contract records.

use crate::session::{SessionSnapshot, TransactionSubmission};
use crate::types::{Address, Post, PostId, Profile, SessionStatus};
use itertools::Itertools;

/// User-facing line for a session status.
#[must_use]
pub const fn status_message(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Uninitialized => "Connecting to web3 provider",
        SessionStatus::ProviderMissing => "No web3 provider detected",
        SessionStatus::AccountDenied => "User denied account access",
        SessionStatus::NetworkUnsupported => "Could not determine the active network",
        SessionStatus::ContractUnresolved => "Contract is not deployed on this network",
        SessionStatus::Ready => "Connected",
    }
}

#[must_use]
pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut lines = vec![status_message(snapshot.status).to_string()];
    if let Some(kind) = snapshot.provider {
        lines.push(format!("Provider: {kind}"));
    }
    if let Some(account) = snapshot.active_account {
        lines.push(format!("Account: {account}"));
    }
    if let Some(network_id) = snapshot.network_id {
        lines.push(format!("Network: {network_id}"));
    }
    if let Some(contract) = snapshot.contract {
        lines.push(format!("Contract: {contract}"));
    }
    lines.join("\n")
}

#[must_use]
pub fn render_profile(owner: Address, profile: &Profile) -> String {
    if profile.is_blank() {
        return format!("No profile for {owner}");
    }
    format!("Username: {}\nBio: {}", profile.username, profile.bio)
}

#[must_use]
pub fn render_post(post_id: PostId, post: &Post) -> String {
    if post.is_empty() {
        return format!("Post #{post_id} does not exist");
    }

    let header = format!(
        "#{post_id} by {} at {}",
        post.creator,
        post.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let counts = format!("{} likes, {} comments", post.like_count, post.comment_count);
    let comments = post.comments.iter().map(|c| format!("  > {c}")).join("\n");

    [header, post.content.clone(), counts, comments]
        .into_iter()
        .filter(|part| !part.is_empty())
        .join("\n")
}

#[must_use]
pub fn render_feed(posts: &[(PostId, Post)]) -> String {
    if posts.is_empty() {
        return "No posts yet".to_string();
    }
    posts
        .iter()
        .map(|(id, post)| render_post(*id, post))
        .join("\n\n")
}

#[must_use]
pub fn render_submission(submission: &TransactionSubmission) -> String {
    if submission.value.is_zero() {
        format!("Submitted {} as {}", submission.method, submission.hash)
    } else {
        format!(
            "Submitted {} paying {} ETH as {}",
            submission.method, submission.value, submission.hash
        )
    }
}
