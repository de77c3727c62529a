use console::style;
use std::str::FromStr;

/// Rendering format for command output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "text" => Ok(Self::Text),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: json, yaml, toml, text",
                s
            )),
        }
    }
}

/// Styled terminal output for human-readable reports
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str, count: usize) {
        println!("\n{} {}", style(message).bold(), style(format!("({})", count)).dim());
        println!("{}", "─".repeat(40));
    }

    pub fn item(&self, message: &str) {
        println!("  {}", message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
