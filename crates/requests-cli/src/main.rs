//! `req`: send one HTTP request through a session and print what happened.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use requests_log::spans::{record_error, record_status, request_span, Timer};
use requests_log::{LogConfig, LogLevel};
use requests_session::{Session, SessionConfig};
use tracing::error;

mod cli;
mod error;

use cli::Cli;
use error::{CliError, Exit};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    match run(cli) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            e.exit().into()
        }
    }
}

fn init_logging(cli: &Cli) {
    let config = LogConfig {
        level: cli.log_level(LogLevel::from_env()),
        ..LogConfig::from_env()
    };
    if let Err(e) = requests_log::init(config) {
        eprintln!("warning: {e}");
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let session_config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::from_env()?,
    };
    let session = Session::with_config(session_config)?;

    let options = cli.request_options().map_err(CliError::Usage)?;
    let request = session.build_request(cli.method.clone(), &cli.url, options)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.curl {
        writeln!(out, "{}", request.to_curl())?;
    }

    if cli.dry_run {
        if !cli.curl {
            write!(out, "{request}")?;
        }
        return Ok(());
    }

    let span = request_span(request.method().as_str(), request.url().as_str());
    let _guard = span.enter();
    let timer = Timer::start("request");

    let mut response = match session.dispatch(request) {
        Ok(response) => response,
        Err(e) => {
            record_error(&e);
            return Err(e.into());
        }
    };
    record_status(&span, response.status().as_u16());
    timer.finish();

    if cli.dump {
        write!(out, "{}", response.to_yaml()?)?;
    } else {
        out.write_all(response.body()?)?;
    }
    out.flush()?;

    Ok(())
}
