//! Terminal presentation for sift.
//!
//! Query envelopes and engine answers are JSON, configuration is TOML; both are shown
//! syntax-highlighted when writing to a terminal. The style helpers color headers,
//! warnings and status lines. A [`Highlighter`] built with [`Highlighter::plain`] passes text
//! through untouched so output can be piped into other tools.

#![warn(missing_docs)]

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

/// Highlights JSON and TOML documents for terminal output.
pub struct Highlighter {
    /// Language definitions, including TOML from the two-face extras.
    syntax_set: SyntaxSet,
    /// Embedded color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// Theme in use.
    theme: EmbeddedThemeName,
    /// Emit escape codes at all.
    enabled: bool,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a highlighter with the Dracula theme.
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme: EmbeddedThemeName::Dracula,
            enabled: true,
        }
    }

    /// Creates a highlighter that returns content unchanged.
    pub fn plain() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Creates a colored or plain highlighter.
    pub fn with_color(color: bool) -> Self {
        if color { Self::new() } else { Self::plain() }
    }

    /// Whether escape codes are emitted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Highlights a JSON document.
    pub fn highlight_json(&self, content: &str) -> String {
        self.highlight(content, "json")
    }

    /// Highlights a TOML document.
    pub fn highlight_toml(&self, content: &str) -> String {
        self.highlight(content, "toml")
    }

    /// Highlights content using the syntax named by extension or name.
    ///
    /// Unknown syntaxes are treated as plain text.
    pub fn highlight(&self, content: &str, syntax_name: &str) -> String {
        if !self.enabled {
            return content.to_string();
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_extension(syntax_name)
            .or_else(|| self.syntax_set.find_syntax_by_name(syntax_name))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self.theme_set.get(self.theme);
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut output = String::new();
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        output.push_str(colors::RESET);
        output
    }
}

/// ANSI escape codes.
pub mod colors {
    /// Bold.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan, for headers.
    pub const CYAN: &str = "\x1b[36m";
    /// Green, for success.
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow, for warnings.
    pub const YELLOW: &str = "\x1b[33m";
    /// Dim.
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Wraps `text` in `codes` and a reset.
fn paint(codes: &[&str], text: &str) -> String {
    format!("{}{text}{}", codes.concat(), colors::RESET)
}

/// Bold cyan header.
pub fn header(text: &str) -> String {
    paint(&[colors::BOLD, colors::CYAN], text)
}

/// Bold subheader.
pub fn subheader(text: &str) -> String {
    paint(&[colors::BOLD], text)
}

/// Dimmed text.
pub fn dim(text: &str) -> String {
    paint(&[colors::DIM], text)
}

/// Green success message.
pub fn success(text: &str) -> String {
    paint(&[colors::GREEN], text)
}

/// Yellow warning.
pub fn warning(text: &str) -> String {
    paint(&[colors::YELLOW], text)
}

/// Indents every non-empty line by three spaces, aligning blocks under list headings.
pub fn indent_content(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("   {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_json() {
        let hl = Highlighter::new();
        let output = hl.highlight_json("{\"query\": {\"match_all\": {}}}\n");
        assert!(output.contains("\x1b["));
        assert!(output.contains("match_all"));
        assert!(output.ends_with(colors::RESET));
    }

    #[test]
    fn test_highlight_toml() {
        let hl = Highlighter::new();
        let output = hl.highlight_toml("[engine]\nurl = \"http://localhost:9200\"\n");
        assert!(output.contains("\x1b["));
        assert!(output.ends_with(colors::RESET));
    }

    #[test]
    fn test_plain_passes_through() {
        let hl = Highlighter::with_color(false);
        assert!(!hl.is_enabled());
        assert_eq!(hl.highlight_json("{}"), "{}");
    }

    #[test]
    fn test_unknown_syntax_falls_back() {
        let output = Highlighter::new().highlight("abc", "no-such-syntax");
        assert!(output.contains("abc"));
    }

    #[test]
    fn test_syntaxes_available() {
        let ss = extra_syntaxes();
        assert!(ss.find_syntax_by_extension("toml").is_some());
        assert!(ss.find_syntax_by_extension("json").is_some());
    }

    #[test]
    fn test_style_helpers() {
        let h = header("Backends");
        assert!(h.starts_with(colors::BOLD));
        assert!(h.contains(colors::CYAN));
        assert!(h.ends_with(colors::RESET));
        assert_eq!(warning("w"), "\x1b[33mw\x1b[0m");
        assert_eq!(success("ok"), "\x1b[32mok\x1b[0m");
    }

    #[test]
    fn test_indent_content() {
        assert_eq!(indent_content("a\n\n  b"), "   a\n\n     b");
    }
}
