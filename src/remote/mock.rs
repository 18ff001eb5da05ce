//! Mock content source for testing

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{RemoteError, RemoteSourceClient};
use crate::address::ContentAddress;

/// Number of calls made to each [`MockSource`] operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub content: usize,
    pub account: usize,
    pub tag: usize,
    pub blog: usize,
    pub replies: usize,
    pub followers: usize,
}

#[derive(Debug, Default)]
struct MockState {
    content: HashMap<String, Value>,
    accounts: HashMap<String, Value>,
    tags: HashMap<String, Vec<Value>>,
    blogs: HashMap<String, Vec<Value>>,
    replies: HashMap<String, Vec<Value>>,
    followers: HashMap<String, u64>,
    failing: bool,
    calls: MockCalls,
}

/// In-memory content source with scripted responses and call counting.
///
/// Unknown posts and accounts yield `None`, unknown listings are empty. In
/// failing mode every operation returns [`RemoteError::Unavailable`].
#[derive(Debug, Default)]
pub struct MockSource {
    state: Mutex<MockState>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_content(&self, address: &str, post: Value) {
        self.state().content.insert(address.to_string(), post);
    }

    /// Keyed by author name.
    pub fn set_account(&self, author: &str, profile: Value) {
        self.state().accounts.insert(author.to_string(), profile);
    }

    pub fn set_tag(&self, tag: &str, posts: Vec<Value>) {
        self.state().tags.insert(tag.to_string(), posts);
    }

    pub fn set_blog(&self, author: &str, posts: Vec<Value>) {
        self.state().blogs.insert(author.to_string(), posts);
    }

    pub fn set_replies(&self, parent: &str, posts: Vec<Value>) {
        self.state().replies.insert(parent.to_string(), posts);
    }

    pub fn set_followers(&self, author: &str, count: u64) {
        self.state().followers.insert(author.to_string(), count);
    }

    /// Switches every operation into (or out of) failure.
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    pub fn calls(&self) -> MockCalls {
        self.state().calls
    }

    fn check(state: &MockState, operation: &str) -> Result<(), RemoteError> {
        if state.failing {
            Err(RemoteError::Unavailable(format!("mock {} failure", operation)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteSourceClient for MockSource {
    async fn fetch_content(&self, address: &ContentAddress) -> Result<Option<Value>, RemoteError> {
        let mut state = self.state();
        state.calls.content += 1;
        Self::check(&state, "content")?;
        Ok(state.content.get(&address.to_string()).cloned())
    }

    async fn fetch_account(&self, address: &ContentAddress) -> Result<Option<Value>, RemoteError> {
        let mut state = self.state();
        state.calls.account += 1;
        Self::check(&state, "account")?;
        Ok(state.accounts.get(&address.author).cloned())
    }

    async fn fetch_discussions_by_tag(
        &self,
        tag: &str,
        limit: usize,
    ) -> Result<Vec<Value>, RemoteError> {
        let mut state = self.state();
        state.calls.tag += 1;
        Self::check(&state, "tag")?;
        let posts = state.tags.get(tag).cloned().unwrap_or_default();
        Ok(posts.into_iter().take(limit).collect())
    }

    async fn fetch_blog_feed(&self, author: &str, limit: usize) -> Result<Vec<Value>, RemoteError> {
        let mut state = self.state();
        state.calls.blog += 1;
        Self::check(&state, "blog")?;
        let posts = state.blogs.get(author).cloned().unwrap_or_default();
        Ok(posts.into_iter().take(limit).collect())
    }

    async fn fetch_replies(&self, parent: &ContentAddress) -> Result<Vec<Value>, RemoteError> {
        let mut state = self.state();
        state.calls.replies += 1;
        Self::check(&state, "replies")?;
        Ok(state
            .replies
            .get(&parent.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_follower_count(&self, address: &ContentAddress) -> Result<u64, RemoteError> {
        let mut state = self.state();
        state.calls.followers += 1;
        Self::check(&state, "followers")?;
        Ok(state.followers.get(&address.author).copied().unwrap_or(0))
    }
}
