//! Learning-driver CLI stub. The active-learning algorithms themselves are a
//! Non-goal (`spec.md` §1: "consume the core"); this binary exists only so
//! the documented external interface (`spec.md` §6 "Learning driver CLI")
//! has a concrete, testable shape: it parses its flags, logs the selected
//! configuration, and reports that the operation is not implemented.
//! Grounded in `original_source/FSMdevel/experimenterLearning.cpp` for the
//! flag shape only.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use fsmcheck::error::FsmError;

/// Runs a mask-selected subset of learning algorithms against a
/// mask-selected set of teacher variants over a directory of `.fsm` files.
/// Not implemented: learning algorithms are out of scope for this crate.
#[derive(Parser, Debug)]
#[command(name = "fsmcheck-learn")]
struct Args {
    /// Directory of `.fsm` files to learn against.
    dir: PathBuf,

    /// Bitmask selecting which learning algorithms to run.
    #[arg(long = "alg-mask", default_value_t = 0u32)]
    algorithm_mask: u32,

    /// Bitmask selecting which teacher variants to use (deterministic,
    /// random-walk, black-box).
    #[arg(long = "teacher-mask", default_value_t = 0u32)]
    teacher_mask: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    info!(
        "learning driver requested: dir={} alg_mask={:#x} teacher_mask={:#x}",
        args.dir.display(),
        args.algorithm_mask,
        args.teacher_mask
    );
    Err(FsmError::NotImplemented("active-learning algorithms are out of scope for this crate").into())
}
