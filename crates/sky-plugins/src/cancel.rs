//! Cooperative cancellation shared between the CLI and long-running work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::PluginError;

/// Shared flag checked by downloads and plugin execution.
///
/// Clones observe the same flag. The CLI registers signal handlers against
/// [`CancelToken::flag`], and operations poll [`CancelToken::is_cancelled`].
///
/// ```
/// use sky_plugins::CancelToken;
///
/// let token = CancelToken::new();
/// let observer = token.clone();
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Fails with [`PluginError::Cancelled`] once cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Cancelled`] when the flag is set.
    pub fn check(&self) -> Result<(), PluginError> {
        if self.is_cancelled() {
            Err(PluginError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Underlying flag, for signal registration and the sandbox watcher.
    #[must_use]
    pub const fn flag(&self) -> &Arc<AtomicBool> {
        &self.flag
    }
}
