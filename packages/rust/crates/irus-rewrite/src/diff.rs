//! Unified diff between a source script and its conversion.

use similar::TextDiff;

const CONTEXT_LINES: usize = 3;

/// Generate a unified diff with `---`/`+++` file headers and `@@` hunks.
///
/// Returns an empty string when the texts are identical.
#[must_use]
pub fn generate_unified_diff(
    original: &str,
    converted: &str,
    source_label: &str,
    target_label: &str,
) -> String {
    if original == converted {
        return String::new();
    }
    TextDiff::from_lines(original, converted)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(source_label, target_label)
        .missing_newline_hint(false)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_and_hunk() {
        let diff = generate_unified_diff(
            "import pyautogui\nx = 1\n",
            "from pynput import mouse\nx = 1\n",
            "bot.py",
            "bot_macos.py",
        );
        assert!(diff.starts_with("--- bot.py\n+++ bot_macos.py\n"));
        assert!(diff.contains("@@"));
        assert!(diff.contains("-import pyautogui"));
        assert!(diff.contains("+from pynput import mouse"));
    }

    #[test]
    fn test_identical_is_empty() {
        assert!(generate_unified_diff("same\n", "same\n", "a", "b").is_empty());
    }
}
