//! ReplyEngine trait definition.
//!
//! The chat service asks an engine for the assistant's answer to a user
//! message. The built-in engine is the deterministic rule cascade; anything
//! that can fail (a remote model, a plugin) slots in behind the same trait.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chatter_types::error::ReplyError;

use super::rules::generate_reply;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Produces assistant reply text for a user message.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition), like the
/// repository traits.
pub trait ReplyEngine: Send + Sync {
    /// Short engine name, recorded in logs.
    fn name(&self) -> &str;

    /// Generate a reply for `text`.
    fn reply(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, ReplyError>> + Send;
}

/// The keyword-cascade engine. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedReplyEngine;

impl RuleBasedReplyEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ReplyEngine for RuleBasedReplyEngine {
    fn name(&self) -> &str {
        "rules"
    }

    async fn reply(&self, text: &str) -> Result<String, ReplyError> {
        Ok(generate_reply(text))
    }
}

/// Object-safe version of [`ReplyEngine`].
pub trait ReplyEngineDyn: Send + Sync {
    fn name_dyn(&self) -> &str;

    fn reply_boxed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<String, ReplyError>>;
}

impl<T: ReplyEngine> ReplyEngineDyn for T {
    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn reply_boxed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<String, ReplyError>> {
        Box::pin(self.reply(text))
    }
}

/// Type-erased [`ReplyEngine`], so the engine can be swapped without changing
/// the service type the HTTP layer holds.
#[derive(Clone)]
pub struct BoxReplyEngine {
    inner: Arc<dyn ReplyEngineDyn>,
}

impl BoxReplyEngine {
    pub fn new<T: ReplyEngine + 'static>(engine: T) -> Self {
        Self {
            inner: Arc::new(engine),
        }
    }
}

impl ReplyEngine for BoxReplyEngine {
    fn name(&self) -> &str {
        self.inner.name_dyn()
    }

    async fn reply(&self, text: &str) -> Result<String, ReplyError> {
        self.inner.reply_boxed(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::rules::GREETING_REPLY;

    #[tokio::test]
    async fn test_rule_engine_delegates_to_rules() {
        let engine = RuleBasedReplyEngine::new();
        assert_eq!(engine.name(), "rules");
        assert_eq!(engine.reply("hey").await.unwrap(), GREETING_REPLY);
        assert!(engine.reply("3 x 7").await.unwrap().contains("21"));
    }

    #[tokio::test]
    async fn test_boxed_engine_forwards() {
        let engine = BoxReplyEngine::new(RuleBasedReplyEngine::new());
        assert_eq!(engine.name(), "rules");
        assert_eq!(engine.reply("thanks").await.unwrap(), crate::reply::rules::GRATITUDE_REPLY);
    }
}
