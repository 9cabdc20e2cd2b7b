//! Request-scoped context passed to every endpoint.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Immutable per-request context.
///
/// Carries the correlation ID and an optional deadline. Cloning is cheap;
/// middleware derives new contexts instead of mutating the one it received.
#[derive(Debug, Clone, Default)]
pub struct Context {
    request_id: Option<Arc<str>>,
    deadline: Option<Instant>,
}

impl Context {
    /// An empty context with no request ID and no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Attach a request ID.
    pub fn with_request_id(mut self, request_id: impl Into<Arc<str>>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attach a deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Attach a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_empty() {
        let ctx = Context::background();
        assert!(ctx.request_id().is_none());
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_expired());
    }

    #[tokio::test]
    async fn test_earliest_deadline_wins() {
        let now = Instant::now();
        let early = now + Duration::from_secs(1);
        let late = now + Duration::from_secs(10);

        let ctx = Context::background().with_deadline(early).with_deadline(late);
        assert_eq!(ctx.deadline(), Some(early));

        let ctx = Context::background().with_deadline(late).with_deadline(early);
        assert_eq!(ctx.deadline(), Some(early));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry() {
        let ctx = Context::background()
            .with_request_id("req-1")
            .with_timeout(Duration::from_millis(50));
        assert_eq!(ctx.request_id(), Some("req-1"));
        assert!(!ctx.is_expired());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }
}
