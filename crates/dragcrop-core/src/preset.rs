//! Fixed-size presets.
//!
//! Preset names use the `"<W>x<H>"` format. The table is configuration
//! data for UI population; parsing accepts any well-formed name, listed
//! or not.

/// Preset name meaning "use the explicit fixed width/height instead".
pub const CUSTOM_PRESET: &str = "Custom";

/// Default preset table offered by the node UI.
pub const DEFAULT_SIZE_PRESETS: &[&str] = &[
    CUSTOM_PRESET,
    "720x1280",
    "1280x720",
    "1024x1024",
    "512x512",
    "768x768",
    "1024x768",
    "768x1024",
    "1920x1080",
    "1080x1920",
    "1280x960",
    "960x1280",
    "640x480",
    "480x640",
];

/// Parse a `"<W>x<H>"` preset name into target dimensions.
///
/// Returns `None` for `"Custom"`, malformed names, and zero dimensions;
/// callers fall back to their explicit fixed width/height.
pub fn parse_preset(name: &str) -> Option<(u32, u32)> {
    if name == CUSTOM_PRESET {
        return None;
    }
    let (w, h) = name.split_once('x')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}
