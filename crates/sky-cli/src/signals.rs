//! Routes termination signals into the invocation's cancellation token.
//!
//! The first `SIGINT` or `SIGTERM` cancels in-flight downloads and running
//! plugins; a second one terminates `sky` immediately.

use std::io;

use sky_plugins::CancelToken;

#[cfg(unix)]
pub(crate) fn forward_to(cancel: &CancelToken) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::flag;

    for signal in [SIGINT, SIGTERM] {
        // Registered before the setter so it sees the flag from an earlier signal.
        flag::register_conditional_shutdown(signal, 130, cancel.flag().clone())?;
        flag::register(signal, cancel.flag().clone())?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn forward_to(cancel: &CancelToken) -> io::Result<()> {
    let _ = cancel;
    Ok(())
}
