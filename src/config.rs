use crate::charset::Charset;
use crate::spinner::SpinnerBuilder;
use clap::Parser;
use std::fs;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = ".spinline.json";
pub const DEFAULT_DURATION_SECS: f64 = 3.0;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, after_help = "\
Examples:\n\
  spinline 'executing task 1...'\n\
  spinline -c classic --concluded '◆' -r 100 -d 5 'executing task 2...'\n\
  spinline -g . -g o -g O 'Building' -- cargo build --release\n\
  ")]
pub struct Cli {
    #[arg(
        long,
        short = 'c',
        value_enum,
        value_name = "CHARSET",
        help = "Built-in glyph sequence to animate with."
    )]
    pub charset: Option<Charset>,
    #[arg(
        long = "glyph",
        short = 'g',
        value_name = "GLYPH",
        help = "Custom animation frame. Repeat to build a sequence; overrides --charset."
    )]
    pub glyphs: Vec<String>,
    #[arg(
        long,
        value_name = "GLYPH",
        help = "Glyph printed in place of the animation once finished."
    )]
    pub concluded: Option<String>,
    #[arg(
        long = "frame-rate",
        short = 'r',
        value_name = "MS",
        help = "Delay between frames, in milliseconds."
    )]
    pub frame_rate: Option<u64>,
    #[arg(
        long,
        short = 'd',
        value_name = "SECS",
        help = "How long to spin when no command is given. Defaults to 3 seconds."
    )]
    pub duration: Option<f64>,
    #[arg(long, help = "Render on standard error instead of standard output.")]
    pub stderr: bool,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Log verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,
    #[arg(value_name = "LABEL", help = "Text shown next to the spinner.")]
    pub label: String,
    #[arg(
        last = true,
        value_name = "COMMAND",
        help = "Command to run while spinning."
    )]
    pub command: Vec<String>,
}

#[derive(serde::Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Config {
    pub charset: Option<Charset>,
    pub glyphs: Option<Vec<String>>,
    pub concluded: Option<String>,
    pub frame_rate_ms: Option<u64>,
    pub duration_secs: Option<f64>,
}

fn config_from_path<P: AsRef<std::path::Path>>(path: P) -> Config {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn get_config() -> Config {
    let local_path = std::path::Path::new(CONFIG_FILE_NAME);
    if local_path.exists() {
        return config_from_path(local_path);
    }

    if let Ok(home) = std::env::var("HOME") {
        let home_path = std::path::PathBuf::from(home).join(CONFIG_FILE_NAME);
        return config_from_path(home_path);
    }

    Config::default()
}

/// Applies the file config, then the command line, on top of `builder`.
/// Both layers go through the same builder calls, so a flag overrides the file.
pub fn configure(builder: SpinnerBuilder, args: &Cli, config: &Config) -> SpinnerBuilder {
    let builder = apply_style(
        builder,
        config.charset,
        config.glyphs.as_deref().unwrap_or_default(),
        config.concluded.as_deref(),
        config.frame_rate_ms,
    );
    apply_style(
        builder,
        args.charset,
        &args.glyphs,
        args.concluded.as_deref(),
        args.frame_rate,
    )
}

fn apply_style(
    mut builder: SpinnerBuilder,
    charset: Option<Charset>,
    glyphs: &[String],
    concluded: Option<&str>,
    frame_rate_ms: Option<u64>,
) -> SpinnerBuilder {
    if let Some(charset) = charset {
        builder = builder.preset(charset);
    }
    if !glyphs.is_empty() {
        builder = builder.charset(glyphs.iter().cloned());
    }
    if let Some(concluded) = concluded {
        builder = builder.concluded_glyph(concluded);
    }
    if let Some(ms) = frame_rate_ms {
        builder = builder.frame_rate(Duration::from_millis(ms));
    }
    builder
}

pub fn get_duration_secs(args: &Cli, config: &Config) -> f64 {
    args.duration
        .or(config.duration_secs)
        .unwrap_or(DEFAULT_DURATION_SECS)
}
