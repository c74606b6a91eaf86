//! Visual theme and styling.
//!
//! Status lines carry a bracketed tag (`[OK]`, `[WARN]`, `[ERROR]`) so that
//! uncolored logs from CI runs stay greppable.

use console::Style;

/// Width of the rule drawn above and below a header.
pub const HEADER_WIDTH: usize = 46;

/// Kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTag {
    Ok,
    Warn,
    Error,
}

impl StatusTag {
    pub fn label(self) -> &'static str {
        match self {
            StatusTag::Ok => "[OK]",
            StatusTag::Warn => "[WARN]",
            StatusTag::Error => "[ERROR]",
        }
    }
}

/// Terminal theme for installer output.
#[derive(Debug, Clone)]
pub struct PeripheryTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub highlight: Style,
    /// Header rule and title.
    pub header: Style,
    /// Commands echoed in error blocks.
    pub command: Style,
    pub border: Style,
    pub hint: Style,
}

impl Default for PeripheryTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PeripheryTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            highlight: Style::new().bold(),
            header: Style::new().blue().bold(),
            command: Style::new().dim().italic(),
            border: Style::new().dim(),
            hint: Style::new().cyan(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            command: Style::new(),
            border: Style::new(),
            hint: Style::new(),
        }
    }

    fn style_for(&self, tag: StatusTag) -> &Style {
        match tag {
            StatusTag::Ok => &self.success,
            StatusTag::Warn => &self.warning,
            StatusTag::Error => &self.error,
        }
    }

    /// Colored tag followed by the plain message.
    pub fn format_status(&self, tag: StatusTag, msg: &str) -> String {
        format!("{} {}", self.style_for(tag).apply_to(tag.label()), msg)
    }

    pub fn format_success(&self, msg: &str) -> String {
        self.format_status(StatusTag::Ok, msg)
    }

    pub fn format_warning(&self, msg: &str) -> String {
        self.format_status(StatusTag::Warn, msg)
    }

    pub fn format_error(&self, msg: &str) -> String {
        self.format_status(StatusTag::Error, msg)
    }

    /// Title framed by `=` rules.
    pub fn format_header(&self, title: &str) -> String {
        let rule = "=".repeat(HEADER_WIDTH);
        format!(
            "{}\n{:^width$}\n{}",
            self.header.apply_to(&rule),
            self.highlight.apply_to(title),
            self.header.apply_to(&rule),
            width = HEADER_WIDTH
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_status_lines_are_tagged() {
        let theme = PeripheryTheme::plain();
        assert_eq!(theme.format_success("docker 24.0.7"), "[OK] docker 24.0.7");
        assert_eq!(theme.format_warning("jq not found"), "[WARN] jq not found");
        assert_eq!(theme.format_error("build failed"), "[ERROR] build failed");
    }

    #[test]
    fn header_is_framed_by_rules() {
        let theme = PeripheryTheme::plain();
        let header = theme.format_header("Komodo Periphery");
        let lines: Vec<&str> = header.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "=".repeat(HEADER_WIDTH));
        assert_eq!(lines[0], lines[2]);
        assert_eq!(lines[1].trim(), "Komodo Periphery");
    }
}
