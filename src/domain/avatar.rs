pub const DEFAULT_AVATAR_FALLBACK: &str = "/images/avatar-fallback.svg";

/// Picks the image to show for a testimonial avatar.
///
/// A missing, blank, or broken source falls back to one fixed asset.
pub fn resolve_avatar<'a>(src: Option<&'a str>, broken: bool, fallback: &'a str) -> &'a str {
    match src.map(str::trim) {
        Some(src) if !src.is_empty() && !broken => src,
        _ => fallback,
    }
}
