use std::time::Duration;

use crate::foundation::core::Rgba8Premul;

pub const DEFAULT_HOST_WIDTH: u32 = 1080;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Host-side knobs that are not part of the user's style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewSettings {
    /// Width of the preview surface; height follows the aspect ratio.
    pub host_width: u32,
    /// Quiet period before a dragged control publishes.
    pub debounce: Duration,
    pub shadow_color: Rgba8Premul,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            host_width: DEFAULT_HOST_WIDTH,
            debounce: DEFAULT_DEBOUNCE,
            shadow_color: Rgba8Premul::from_straight_rgba(0x80, 0x80, 0x80, 0xff),
        }
    }
}

impl PreviewSettings {
    /// Defaults overridden by `FRAMECARD_HOST_WIDTH` and `FRAMECARD_DEBOUNCE_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let host_width = lookup("FRAMECARD_HOST_WIDTH")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.host_width);
        let debounce = lookup("FRAMECARD_DEBOUNCE_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&n| n > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);
        Self {
            host_width,
            debounce,
            ..defaults
        }
    }
}
