//! Component G: the testing methods and checking-sequence methods built on
//! top of components D–F. `spec.md` §4.G.

pub mod checking;
pub mod suite;

use std::str::FromStr;

use crate::error::FsmError;

/// The six test-suite methods exposed by the CLI (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    W,
    Wp,
    Hsi,
    H,
    Spy,
    Spyh,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::W => "w",
            Method::Wp => "wp",
            Method::Hsi => "hsi",
            Method::H => "h",
            Method::Spy => "spy",
            Method::Spyh => "spyh",
        }
    }
}

impl FromStr for Method {
    type Err = FsmError;

    /// Dispatch is a plain `match` on the lowercased name. `spec.md` §9 Design
    /// Note (iii) flags a branch in the original that treated
    /// `method.compare(...) != 0` as "equal" — the opposite of the stdlib
    /// convention. That is not reproduced: a name either matches one of the
    /// six methods or the whole lookup fails, which is what a careful reading
    /// of `compare() == 0` (C++'s actual "equal" convention) already implies.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" => Ok(Method::W),
            "wp" => Ok(Method::Wp),
            "hsi" => Ok(Method::Hsi),
            "h" => Ok(Method::H),
            "spy" => Ok(Method::Spy),
            "spyh" => Ok(Method::Spyh),
            other => Err(FsmError::UnknownMethod(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip() {
        for m in [Method::W, Method::Wp, Method::Hsi, Method::H, Method::Spy, Method::Spyh] {
            assert_eq!(Method::from_str(m.name()).unwrap(), m);
        }
    }

    #[test]
    fn unknown_method_name_is_an_error() {
        assert!(Method::from_str("bogus").is_err());
        assert!(Method::from_str("W").is_ok()); // case-insensitive
    }
}
