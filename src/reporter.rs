//! Per-operation diagnostics sink. `spec.md` §5/§9 calls for replacing the
//! original's process-wide `outFile`/`fsm` globals with an explicit value
//! threaded through each operation; this is that value.

use std::io::{self, Write};
use std::time::Duration;

use log::info;

use crate::types::{sequence_to_string, InputSequence};

/// Accumulates the figures the CLI prints to stderr after a run
/// (`fsm_name`, `ctt`, `es`, `total_resets`, `total_length`, `time_elapsed`)
/// and, separately, the per-test-case lines printed to stdout.
#[derive(Debug, Default)]
pub struct Reporter {
    fsm_name: String,
    method: String,
    extra_states: i64,
    total_resets: usize,
    total_length: usize,
    elapsed: Duration,
}

impl Reporter {
    pub fn new(fsm_name: impl Into<String>, method: impl Into<String>, extra_states: i64) -> Self {
        Reporter {
            fsm_name: fsm_name.into(),
            method: method.into(),
            extra_states,
            total_resets: 0,
            total_length: 0,
            elapsed: Duration::default(),
        }
    }

    /// Records a whole test suite: one reset per test case, and its total
    /// input length.
    pub fn record_suite(&mut self, suite: &[InputSequence]) {
        self.total_resets += suite.len();
        self.total_length += suite.iter().map(|s| s.len()).sum::<usize>();
    }

    /// Records a single checking sequence: exactly one reset.
    pub fn record_checking_sequence(&mut self, seq: &InputSequence) {
        self.total_resets += 1;
        self.total_length += seq.len();
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Prints `tc_<i>:\t<seq>` for every test case to `out`, matching the
    /// original CLI's stdout format (`spec.md` §6).
    pub fn write_test_cases(&self, mut out: impl Write, suite: &[InputSequence]) -> io::Result<()> {
        for (i, seq) in suite.iter().enumerate() {
            writeln!(out, "tc_{}:\t{}", i, sequence_to_string(seq))?;
        }
        Ok(())
    }

    /// Prints the diagnostic summary line to `out` (stderr in the CLI).
    pub fn write_summary(&self, mut out: impl Write) -> io::Result<()> {
        writeln!(
            out,
            "fsm_name={} method={} es={} total_resets={} total_length={} time_elapsed={:?}",
            self.fsm_name, self.method, self.extra_states, self.total_resets, self.total_length, self.elapsed
        )?;
        info!(
            "{} ({}): {} test cases, {} total length, {:?}",
            self.fsm_name, self.method, self.total_resets, self.total_length, self.elapsed
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_suite_resets_and_length() {
        let mut r = Reporter::new("f", "w", 0);
        r.record_suite(&[vec![0, 1], vec![1]]);
        assert_eq!(r.total_resets, 2);
        assert_eq!(r.total_length, 3);
    }

    #[test]
    fn records_checking_sequence_as_a_single_reset() {
        let mut r = Reporter::new("f", "c", 0);
        r.record_checking_sequence(&vec![0, 1, 0]);
        assert_eq!(r.total_resets, 1);
        assert_eq!(r.total_length, 3);
    }

    #[test]
    fn writes_one_line_per_test_case() {
        let r = Reporter::new("f", "w", 0);
        let mut buf = Vec::new();
        r.write_test_cases(&mut buf, &[vec![0, 1]]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "tc_0:\t0 1\n");
    }
}
