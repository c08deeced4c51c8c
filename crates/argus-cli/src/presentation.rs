use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Terminal coloring for the engine's plain report lines.
///
/// Coloring never changes the text itself, only wraps whole lines in ANSI
/// styles, so stripping the escapes gives back the engine output.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Color only when stdout is a terminal and neither `--no-color` nor
    /// `NO_COLOR` asks otherwise.
    pub fn detect(no_color: bool) -> Self {
        let env_disabled = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::new(!no_color && !env_disabled && std::io::stdout().is_terminal())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn paint(&self, line: &str) -> String {
        if !self.enabled {
            return line.to_string();
        }

        match classify(line) {
            Style::Header => line.bold().to_string(),
            Style::Bad => line.red().to_string(),
            Style::Good => line.green().to_string(),
            Style::Hint => line.yellow().to_string(),
            Style::Plain => line.to_string(),
        }
    }

    pub fn print_lines<'a>(&self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            println!("{}", self.paint(line));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Header,
    Bad,
    Good,
    Hint,
    Plain,
}

fn classify(line: &str) -> Style {
    if is_header(line) {
        return Style::Header;
    }

    let trimmed = line.trim_start();
    if trimmed.starts_with("RESULT: fixed") || trimmed.starts_with("No failures detected") {
        return Style::Good;
    }
    if trimmed.starts_with("RESULT: regressed")
        || trimmed.contains("(failure)")
        || trimmed.contains(" FAILED")
    {
        return Style::Bad;
    }
    if trimmed.starts_with("Root cause:") || trimmed.starts_with("Note:") {
        return Style::Hint;
    }
    Style::Plain
}

// Section headers are unindented upper-case labels like "WHY IT FAILED:".
fn is_header(line: &str) -> bool {
    if line.starts_with("====") {
        return true;
    }
    let label = line.strip_suffix(':').unwrap_or(line);
    label.chars().any(|c| c.is_ascii_uppercase())
        && label
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == ' ' || c == '-' || c == '_')
}
