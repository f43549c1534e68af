//! Detection of the runtime's ambient language.

/// Language used when the runtime reports nothing usable.
pub const FALLBACK_LANG: &str = "en";

/// Reads the runtime's language and keeps its primary subtag.
///
/// Desktop reads `LC_ALL`, `LC_MESSAGES` then `LANG`; the web reads
/// `navigator.language`. `"fr-CA"` and `"fr_CA.UTF-8"` both give `"fr"`.
pub fn detect_ambient_lang() -> String {
    detect_raw_locale()
        .as_deref()
        .and_then(primary_language)
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn detect_raw_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

#[cfg(target_arch = "wasm32")]
fn detect_raw_locale() -> Option<String> {
    web_sys::window().and_then(|window| window.navigator().language())
}

/// Primary language subtag of a BCP 47 tag or POSIX locale name.
///
/// Returns `None` when nothing is left after splitting. The `C` and `POSIX`
/// locales map to [`FALLBACK_LANG`].
pub fn primary_language(raw: &str) -> Option<String> {
    let primary = raw.trim().split(['-', '_', '.', '@']).next()?.trim();
    if primary.is_empty() {
        return None;
    }
    if primary.eq_ignore_ascii_case("c") || primary.eq_ignore_ascii_case("posix") {
        return Some(FALLBACK_LANG.to_string());
    }
    Some(primary.to_string())
}
