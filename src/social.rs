#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::provider::Provider;
use crate::session::{ContractSession, SendOptions, TransactionSubmission};
use crate::types::{Address, Post, PostId, Profile, Wei};
use crate::{Result, SessionError};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Contract method names. Exact spelling and parameter order are part of
/// the deployed contract's interface.
pub mod methods {
    pub const UPDATE_USER_PROFILE: &str = "updateUserProfile";
    pub const CREATE_POST: &str = "createPost";
    pub const LIKE_POST: &str = "likePost";
    pub const COMMENT_ON_POST: &str = "commentOnPost";
    pub const GET_POST: &str = "getPost";
    pub const PROFILES: &str = "profiles";
}

/// Largest number of posts a single feed request may ask for.
pub const MAX_FEED_LIMIT: u64 = 100;

/// Post reads a feed keeps in flight at once.
pub const FEED_READ_CONCURRENCY: usize = 8;

/// Payments attached to the payable methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub create_post: Wei,
    pub like_post: Wei,
    pub comment_on_post: Wei,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            create_post: Wei::new(10_000_000_000_000_000),
            like_post: Wei::new(5_000_000_000_000_000),
            comment_on_post: Wei::new(5_000_000_000_000_000),
        }
    }
}

/// Typed access to the social contract through a ready session.
pub struct SocialClient<'s, P> {
    session: &'s ContractSession<P>,
    fees: FeeSchedule,
}

impl<'s, P> SocialClient<'s, P>
where
    P: Provider + Send + Sync,
{
    #[must_use]
    pub const fn new(session: &'s ContractSession<P>, fees: FeeSchedule) -> Self {
        Self { session, fees }
    }

    #[must_use]
    pub const fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// # Errors
    /// `InvalidInvocation` for an empty username, otherwise as
    /// [`ContractSession::send`].
    pub async fn update_profile(&self, username: &str, bio: &str) -> Result<TransactionSubmission> {
        require_text("username", username)?;
        self.session
            .send(
                methods::UPDATE_USER_PROFILE,
                vec![json!(username), json!(bio)],
                SendOptions::default(),
            )
            .await
    }

    /// # Errors
    /// `InvalidInvocation` for blank content, otherwise as [`ContractSession::send`].
    pub async fn create_post(&self, content: &str) -> Result<TransactionSubmission> {
        require_text("content", content)?;
        self.session
            .send(
                methods::CREATE_POST,
                vec![json!(content)],
                SendOptions::paying(self.fees.create_post),
            )
            .await
    }

    /// # Errors
    /// As [`ContractSession::send`].
    pub async fn like_post(&self, post_id: PostId) -> Result<TransactionSubmission> {
        self.session
            .send(
                methods::LIKE_POST,
                vec![json!(post_id.value())],
                SendOptions::paying(self.fees.like_post),
            )
            .await
    }

    /// # Errors
    /// `InvalidInvocation` for blank content, otherwise as [`ContractSession::send`].
    pub async fn comment_on_post(
        &self,
        post_id: PostId,
        content: &str,
    ) -> Result<TransactionSubmission> {
        require_text("content", content)?;
        self.session
            .send(
                methods::COMMENT_ON_POST,
                vec![json!(post_id.value()), json!(content)],
                SendOptions::paying(self.fees.comment_on_post),
            )
            .await
    }

    /// Reads a post. Unknown ids come back as [`Post::empty`].
    ///
    /// # Errors
    /// As [`ContractSession::call`], plus `QueryFailed` when the result does
    /// not decode as a post.
    pub async fn get_post(&self, post_id: PostId) -> Result<Post> {
        let raw = self
            .session
            .call(methods::GET_POST, vec![json!(post_id.value())])
            .await?;
        decode(methods::GET_POST, raw)
    }

    /// # Errors
    /// As [`ContractSession::call`], plus `QueryFailed` when the result does
    /// not decode as a profile.
    pub async fn profile(&self, owner: Address) -> Result<Profile> {
        let raw = self
            .session
            .call(methods::PROFILES, vec![json!(owner.to_string())])
            .await?;
        decode(methods::PROFILES, raw)
    }

    /// Profile of the session's active account.
    ///
    /// # Errors
    /// `NotReady` if the session has no active account, otherwise as [`Self::profile`].
    pub async fn my_profile(&self) -> Result<(Address, Profile)> {
        let owner = self
            .session
            .active_account()
            .ok_or_else(|| SessionError::NotReady(self.session.status()))?;
        let profile = self.profile(owner).await?;
        Ok((owner, profile))
    }

    /// Posts from #1 up to the first empty one, at most `limit` of them.
    ///
    /// Reads run [`FEED_READ_CONCURRENCY`] at a time; no new read starts
    /// once an empty post has come back.
    ///
    /// # Errors
    /// `InvalidInvocation` if `limit` exceeds [`MAX_FEED_LIMIT`], otherwise
    /// the first failing read.
    pub async fn feed(&self, limit: u64) -> Result<Vec<(PostId, Post)>> {
        if limit > MAX_FEED_LIMIT {
            return Err(SessionError::InvalidInvocation(format!(
                "feed limit {limit} exceeds the maximum of {MAX_FEED_LIMIT}"
            )));
        }

        let mut reads = stream::iter(1..=limit)
            .map(|id| async move {
                let post_id = PostId::new(id);
                self.get_post(post_id).await.map(|post| (post_id, post))
            })
            .buffered(FEED_READ_CONCURRENCY);

        let mut posts = Vec::new();
        while let Some(read) = reads.next().await {
            let (post_id, post) = read?;
            if post.is_empty() {
                break;
            }
            posts.push((post_id, post));
        }
        Ok(posts)
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SessionError::InvalidInvocation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

fn decode<T>(method: &str, raw: Value) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(raw)
        .map_err(|e| SessionError::QueryFailed(format!("unexpected {method} result: {e}")))
}
