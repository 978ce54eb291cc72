//! Shared formatting utilities for size display and console output

use console::Emoji;
use std::time::Duration;

/// Wrench emoji for tool checks
pub const WRENCH: Emoji = Emoji("🔧 ", "* ");

/// Rocket emoji for build start
pub const ROCKET: Emoji = Emoji("🚀 ", "> ");

/// Package emoji for written bundles
pub const PACKAGE: Emoji = Emoji("📦 ", "");

/// Folder emoji for copied assets
pub const FOLDER: Emoji = Emoji("📁 ", "");

/// Small check mark for list items
pub const CHECK: Emoji = Emoji("✓", "+");

/// Small cross for failed list items
pub const CROSS: Emoji = Emoji("✗", "x");

/// Checkmark emoji for success
pub const CHECKMARK: Emoji = Emoji("✅ ", "[OK] ");

/// Crossmark emoji for failure
pub const CROSSMARK: Emoji = Emoji("❌ ", "[FAIL] ");

/// Sparkles emoji for completion/success
pub const SPARKLES: Emoji = Emoji("✨ ", "* ");

/// Light bulb emoji for hints
pub const LIGHTBULB: Emoji = Emoji("💡 ", "? ");

/// Info emoji for informational messages
pub const INFO: Emoji = Emoji("ℹ️ ", "i ");

/// Warning emoji for caution/alerts
pub const WARNING: Emoji = Emoji("⚠️ ", "! ");

/// Format bytes as human-readable size string
///
/// # Examples
///
/// ```
/// use assetpipe::fmt::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1_048_576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a build duration, milliseconds below one second
pub fn format_duration(duration: Duration) -> String {
    if duration.as_secs() == 0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
