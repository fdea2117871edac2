//! The `ConversationSource` trait — read-only access to the remote WhatsApp
//! conversation database.
//!
//! Implemented by `leadbook-source-mysql` in production and by in-memory
//! fakes in sync tests.

use std::future::Future;

use crate::conversation::{Conversation, SourceStats};

/// A read-only feed of WhatsApp conversations.
///
/// Implementations open whatever connection they need per call and release
/// it before returning; callers hold no connection state between calls.
pub trait ConversationSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch every eligible conversation, newest first. There is no
  /// incremental variant; each sync pass rescans the full set and relies on
  /// upsert idempotence.
  fn fetch_conversations(
    &self,
  ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>> + Send + '_;

  /// Aggregate counts for the stats endpoint.
  fn fetch_stats(
    &self,
  ) -> impl Future<Output = Result<SourceStats, Self::Error>> + Send + '_;
}
