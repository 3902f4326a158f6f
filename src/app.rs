use std::error::Error;
use std::io::{self, Write};
use std::process::Output;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use crate::config;
use crate::spinner::Spinner;
use crate::term::Sink;

#[derive(Debug)]
pub enum SpinlineError {
    InvalidDuration(String),
    CommandSpawn(String),
    CommandFailed { program: String, code: Option<i32> },
}

impl std::fmt::Display for SpinlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinlineError::InvalidDuration(e) => write!(f, "Invalid duration: {}", e),
            SpinlineError::CommandSpawn(e) => write!(f, "{}", e),
            SpinlineError::CommandFailed { program, code: Some(code) } => {
                write!(f, "'{}' exited with status {}", program, code)
            }
            SpinlineError::CommandFailed { program, code: None } => {
                write!(f, "'{}' was terminated by a signal", program)
            }
        }
    }
}

impl Error for SpinlineError {}

impl SpinlineError {
    /// Process exit code for this error. A failed child keeps its own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            SpinlineError::CommandFailed { code: Some(code), .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub async fn run(args: &config::Cli) -> Result<(), SpinlineError> {
    let config = config::get_config();
    let sink: Box<dyn Sink> = if args.stderr {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    run_with_sink(args, &config, sink).await
}

/// Spins on `sink` while the task runs: either the trailing command, or a plain
/// wait of the configured duration. The command's captured output is replayed
/// only after the concluded line, so it never tears the animation.
pub async fn run_with_sink(
    args: &config::Cli,
    config: &config::Config,
    sink: Box<dyn Sink>,
) -> Result<(), SpinlineError> {
    let wait = if args.command.is_empty() {
        Some(parse_duration(config::get_duration_secs(args, config))?)
    } else {
        None
    };

    let spinner = config::configure(Spinner::builder(&args.label), args, config)
        .writer(sink)
        .build();
    info!(
        label = %spinner.label(),
        interactive = spinner.is_interactive(),
        "spinner ready"
    );

    let start_time = Instant::now();
    spinner.start();

    let outcome = match wait {
        Some(duration) => {
            tokio::time::sleep(duration).await;
            Ok(None)
        }
        None => run_command(&args.command).await.map(Some),
    };

    spinner.stop();
    debug!(elapsed = ?start_time.elapsed(), "task finished");

    let Some(output) = outcome? else {
        return Ok(());
    };

    replay_output(&output);

    if output.status.success() {
        Ok(())
    } else {
        Err(SpinlineError::CommandFailed {
            program: args.command[0].clone(),
            code: output.status.code(),
        })
    }
}

async fn run_command(command: &[String]) -> Result<Output, SpinlineError> {
    let (program, rest) = command
        .split_first()
        .ok_or_else(|| SpinlineError::CommandSpawn("no command given".to_string()))?;
    debug!(program = %program, args = ?rest, "running command");
    tokio::process::Command::new(program)
        .args(rest)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map_err(|e| SpinlineError::CommandSpawn(format!("Failed to run '{}': {}", program, e)))
}

fn replay_output(output: &Output) {
    if !output.stdout.is_empty() {
        replay(&mut io::stdout(), &output.stdout);
    }
    if !output.stderr.is_empty() {
        replay(&mut io::stderr(), &output.stderr);
    }
}

fn replay(writer: &mut dyn Write, bytes: &[u8]) {
    if let Err(e) = writer.write_all(bytes).and_then(|_| writer.flush()) {
        debug!("replaying command output failed: {}", e);
    }
}

fn parse_duration(secs: f64) -> Result<Duration, SpinlineError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| SpinlineError::InvalidDuration(format!("{}: {}", secs, e)))
}
