// crates/flt2vhs-cli/src/cmd/mod.rs

pub mod cat;
pub mod convert;
pub mod inspect;

/// Exit code for a conversion that succeeded on a cut-short recording.
pub const EXIT_TRUNCATED: i32 = 2;
