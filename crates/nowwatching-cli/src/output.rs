use clap::ValueEnum;
use nowwatching_core::{ContentType, MediaPlayerView, PlayerState};
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
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
        self.message("success", msg.as_ref(), |m| println!("{} {}", "✓".green(), m));
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.message("info", msg.as_ref(), |m| println!("{}", m));
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message("warning", msg.as_ref(), |m| println!("{} {}", "⚠".yellow(), m));
    }

    pub fn println(&self, msg: impl AsRef<str>) {
        self.message("info", msg.as_ref(), |m| println!("{}", m));
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors are shown even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "error", "message": msg.as_ref() }));
            }
        }
    }

    fn message(&self, kind: &str, msg: &str, human: impl FnOnce(&str)) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => human(msg),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": kind, "message": msg }));
            }
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }
        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Json | OutputFormat::Human => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
        }
    }

    /// One line per published state in human mode, the full view otherwise.
    pub fn player(&self, view: &MediaPlayerView) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", describe(view)),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&serde_json::to_value(view).unwrap_or_default());
            }
        }
    }
}

fn describe(view: &MediaPlayerView) -> String {
    if view.state == PlayerState::Off {
        return format!("{} {}", "■".bright_black(), "Nothing playing".bright_black());
    }

    let title = view.title.as_deref().unwrap_or("Unknown");
    let what = match view.content_type {
        Some(ContentType::TvShow) => {
            let show = view.series_title.as_deref().unwrap_or("Unknown show");
            match (view.season, view.episode) {
                (Some(season), Some(episode)) => format!("{} S{:02}E{:02} {}", show, season, episode, title),
                _ => format!("{} - {}", show, title),
            }
        }
        Some(ContentType::Movie) => match view.year {
            Some(year) => format!("{} ({})", title, year),
            None => title.to_string(),
        },
        None => title.to_string(),
    };

    let progress = match (view.position_secs, view.duration_secs) {
        (Some(position), Some(duration)) => format!(" [{}/{}]", clock(position), clock(duration)),
        _ => String::new(),
    };

    format!("{} {}{}", "▶".green(), what.bold(), progress)
}

fn clock(secs: u64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
