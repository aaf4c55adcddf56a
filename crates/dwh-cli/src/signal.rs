use dwh_core::CancelToken;
use tracing::warn;

/// Trip `token` on the first Ctrl-C so a poll loop stops waiting.
///
/// Resources the control plane has already accepted stay as they are;
/// re-running the same command picks up from there.
pub fn cancel_on_ctrl_c(token: CancelToken) {
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!(error = %e, "Ctrl-C handling unavailable");
                return;
            }
        };
        if rt.block_on(tokio::signal::ctrl_c()).is_ok() {
            warn!("interrupted, stopping at the next wait");
            token.cancel();
        }
    });
}
