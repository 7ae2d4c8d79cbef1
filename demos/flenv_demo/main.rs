//! Demo: decode a server config from flags, environment and defaults.
//!
//! ```sh
//! cargo run --example flenv_demo -- --port 9090 -s extra args
//! PORT=8081 cargo run --example flenv_demo
//! RUST_LOG=flenv=debug cargo run --example flenv_demo -- --help
//! ```

use std::process::ExitCode;
use std::time::Duration;

use flenv::{Field, Flenv, FlenvError, Kind};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Deserialize)]
struct ServerConfig {
    host: String,
    port: u16,
    secure: bool,
    timeout: Duration,
    upstream: Option<Url>,
    #[serde(default)]
    help: bool,
}

fn builder() -> flenv::FlenvBuilder<ServerConfig> {
    Flenv::builder::<ServerConfig>()
        .field(
            Field::new("host", Kind::Str)
                .env("DEMO_HOST")
                .flag("-h,--host")
                .default("127.0.0.1")
                .help("Address to bind to"),
        )
        .field(
            Field::new("port", Kind::Uint)
                .env("PORT")
                .flag("-p,--port")
                .default("8080")
                .help("Port to listen on"),
        )
        .field(
            Field::new("secure", Kind::Bool)
                .env("DEMO_SECURE")
                .flag("-s,--secure")
                .default("false")
                .help("Terminate TLS in-process instead of behind a proxy"),
        )
        .field(
            Field::new("timeout", Kind::Duration)
                .env("DEMO_TIMEOUT")
                .flag("--timeout")
                .default("30s")
                .help("How long to wait for the upstream before giving up"),
        )
        .field(
            Field::new("upstream", Kind::Url)
                .env("DEMO_UPSTREAM")
                .flag("--upstream")
                .help("Backend to forward requests to"),
        )
        .field(Field::new("help", Kind::Bool).flag("--help").help("Show this help"))
}

fn run() -> Result<(), FlenvError> {
    let decoded = builder().decode()?;
    if decoded.config.help {
        print!("{}", builder().usage()?);
        return Ok(());
    }

    println!("{:#?}", decoded.config);
    if !decoded.positionals.is_empty() {
        println!("positionals: {:?}", decoded.positionals);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let Ok(usage) = builder().usage() {
                eprint!("{usage}");
            }
            ExitCode::from(2)
        }
    }
}
