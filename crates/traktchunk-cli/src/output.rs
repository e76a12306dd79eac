use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// Command output. Status lines go to stdout, except errors which go to
/// stderr in human mode; in JSON modes every line is a `{type, message}` object.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

enum Level {
    Success,
    Info,
    Warn,
    Error,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.status(Level::Success, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.status(Level::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.status(Level::Warn, msg.as_ref());
    }

    /// Shown even with `--quiet`.
    pub fn error(&self, msg: impl AsRef<str>) {
        self.status(Level::Error, msg.as_ref());
    }

    /// Structured result of a command; suppressed by `--quiet`.
    pub fn json(&self, data: &Value) {
        if !self.quiet {
            self.print_json(data);
        }
    }

    fn status(&self, level: Level, msg: &str) {
        if self.quiet && !matches!(level, Level::Error) {
            return;
        }

        if self.format != OutputFormat::Human {
            let kind = match level {
                Level::Success => "success",
                Level::Info => "info",
                Level::Warn => "warning",
                Level::Error => "error",
            };
            self.print_json(&json!({ "type": kind, "message": msg }));
            return;
        }

        match level {
            Level::Success => println!("{} {}", "✓".green(), msg),
            Level::Info => println!("{}", msg),
            Level::Warn => println!("{} {}", "⚠".yellow(), msg),
            Level::Error => eprintln!("{} {}", "✗".red(), msg),
        }
    }

    fn print_json(&self, data: &Value) {
        let line = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(data),
            OutputFormat::Json | OutputFormat::Human => serde_json::to_string(data),
        };
        println!("{}", line.unwrap_or_default());
    }
}
