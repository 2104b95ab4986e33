//! System clipboard access
//!
//! Used to copy certificate IDs. The clipboard handle is opened per copy and
//! dropped right after; callers run this off the UI task since some
//! platforms block while a clipboard owner is negotiated.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Put `text` on the system clipboard.
///
/// Fails without a display server (headless Linux, SSH sessions).
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Nothing to copy");
    }
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to set clipboard text")?;
    tracing::debug!(len = text.len(), "copied to clipboard");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_rejected_before_touching_clipboard() {
        let err = copy_to_clipboard("   ").unwrap_err();
        assert_eq!(err.to_string(), "Nothing to copy");
    }
}
