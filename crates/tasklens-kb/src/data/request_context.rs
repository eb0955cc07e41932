//! Request context for log correlation and timing

use std::time::{Duration, Instant};

use super::identifiers::RequestId;

/// Context carried through one ingest or search invocation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    started: Instant,
}

impl RequestContext {
    /// Creates a context with a fresh request id, starting the clock now.
    pub fn new_root() -> Self {
        Self {
            request_id: RequestId::new_v4(),
            started: Instant::now(),
        }
    }

    /// Time since the request started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Elapsed time in milliseconds, as logged.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_root() {
        let a = RequestContext::new_root();
        let b = RequestContext::new_root();
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let ctx = RequestContext::new_root();
        let first = ctx.elapsed();
        let second = ctx.elapsed();
        assert!(second >= first);
        assert!(ctx.elapsed_ms() >= 0.0);
    }
}
