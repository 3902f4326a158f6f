use clap::Parser;
use spinline::{app, config};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let args = config::Cli::parse();
    init_tracing(args.verbose);

    if let Err(e) = app::run(&args).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
