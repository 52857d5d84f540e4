//! Checking-experiment CLI. Grounded in `original_source/FSMdevel/main.cpp`:
//! same flags, same `tc_<i>:\t<seq>` stdout format, same stderr diagnostics
//! line, with the method dispatch reproduced as a conventional `match`
//! (`spec.md` §9 Design Note (iii)).

use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use fsmcheck::fsm::Fsm;
use fsmcheck::methods::{suite, Method};
use fsmcheck::reporter::Reporter;

/// Builds a checking-experiment test suite for a finite state machine.
#[derive(Parser, Debug)]
#[command(name = "fsmcheck")]
struct Args {
    /// Load the FSM from PATH instead of stdin.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Extra-state bound (non-negative).
    #[arg(short = 'e', long = "es", default_value_t = 0)]
    extra_states: i64,

    /// Testing method: w, wp, hsi, h, spy, spyh.
    #[arg(short = 'm', long = "method", default_value = "w")]
    method: String,

    /// Also STOUT-interleave every appended identifier.
    #[arg(long = "stout")]
    stout: bool,

    /// Print the fsm_name/ctt/es/total_resets/total_length/time_elapsed
    /// diagnostics line to stderr.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let fsm_name = args
        .file
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<stdin>".to_string());

    let fsm = load_fsm(&args.file).context("failed to load FSM")?;
    let method = Method::from_str(&args.method).context("unknown testing method")?;

    let start = Instant::now();
    let test_suite = match method {
        Method::W => suite::w_method(&fsm, args.extra_states, args.stout),
        Method::Wp => suite::wp_method(&fsm, args.extra_states, args.stout),
        Method::Hsi => suite::hsi_method(&fsm, args.extra_states, args.stout),
        Method::H => suite::h_method(&fsm, args.extra_states, args.stout),
        Method::Spy => suite::spy_method(&fsm, args.extra_states, args.stout),
        Method::Spyh => suite::spyh_method(&fsm, args.extra_states, args.stout),
    };
    let elapsed = start.elapsed();

    let mut reporter = Reporter::new(fsm_name, method.name(), args.extra_states);
    reporter.record_suite(&test_suite);
    reporter.set_elapsed(elapsed);

    let stdout = io::stdout();
    reporter.write_test_cases(stdout.lock(), &test_suite)?;
    if args.verbose {
        let stderr = io::stderr();
        reporter.write_summary(stderr.lock())?;
    }

    Ok(())
}

fn load_fsm(file: &Option<PathBuf>) -> Result<Fsm> {
    match file {
        Some(path) => Fsm::load(path).map_err(Into::into),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read FSM from stdin")?;
            Fsm::load_str(&text).map_err(Into::into)
        }
    }
}
