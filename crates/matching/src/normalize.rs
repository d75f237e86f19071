use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Case- and diacritic-insensitive canonical form of a name fragment.
///
/// NFD decomposition splits accented characters into base character plus
/// combining marks; the marks are dropped and the remainder lowercased.
/// Total on any input, including the empty string.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
