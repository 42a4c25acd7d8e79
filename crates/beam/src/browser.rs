//! Browser opening.
//!
//! Spawns the platform's opener a moment after startup so the server is
//! already listening when the browser connects. Failure to open a browser is
//! never fatal.

use std::process::{Command, Stdio};
use std::time::Duration;

/// Delay before opening, giving the server time to bind.
const OPEN_DELAY: Duration = Duration::from_millis(1500);

/// Open `url` in the default browser after a short delay.
pub(crate) fn open_after_start(url: String) {
    tokio::spawn(async move {
        tokio::time::sleep(OPEN_DELAY).await;

        let result = if cfg!(target_os = "macos") {
            Command::new("open").arg(&url).stdout(Stdio::null()).stderr(Stdio::null()).spawn()
        } else if cfg!(target_os = "windows") {
            Command::new("cmd")
                .args(["/C", "start", ""])
                .arg(&url)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
        } else {
            Command::new("xdg-open").arg(&url).stdout(Stdio::null()).stderr(Stdio::null()).spawn()
        };

        match result {
            Ok(_) => tracing::info!(url = %url, "opened browser"),
            Err(err) => tracing::warn!(url = %url, error = %err, "could not open browser"),
        }
    });
}
