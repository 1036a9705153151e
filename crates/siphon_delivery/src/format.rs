//! Length-based text folding.

const TRUNCATE_OVER: usize = 1020;
const TRUNCATE_TO: usize = 1000;
const FOLD_OVER: usize = 500;
const FOLD_OVER_LINES: usize = 10;
const ELLIPSIS: &str = "......";

/// Fold long text into a collapsible block.
///
/// Over 1020 characters the text is cut to 1000 plus an ellipsis and
/// folded; over 500 characters or 10 lines it is folded whole; anything
/// shorter comes back trimmed but otherwise unchanged.
///
/// # Examples
///
/// ```
/// use siphon_delivery::collapse;
///
/// assert_eq!(collapse("short"), "short");
/// assert!(collapse(&"x".repeat(600)).starts_with("<blockquote expandable>"));
/// ```
pub fn collapse(text: &str) -> String {
    let text = text.trim();
    let chars = text.chars().count();

    if chars > TRUNCATE_OVER {
        let head: String = text.chars().take(TRUNCATE_TO).collect();
        fold(&format!("{head}{ELLIPSIS}"))
    } else if chars > FOLD_OVER || text.lines().count() > FOLD_OVER_LINES {
        fold(text)
    } else {
        text.to_string()
    }
}

fn fold(text: &str) -> String {
    format!("<blockquote expandable>{text}</blockquote>")
}
