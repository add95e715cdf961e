//! Configuration and constants for the CLI.

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Prefix of anonymous function names in the dump (`N=(@?0x7f1b9e6b1d73)`)
pub const ANONYMOUS_PREFIX: &str = "@?0x";

/// Counter name that may accompany the value triple (`V0=(PERF_TICKS)`)
pub const PERF_TICKS_COUNTER: &str = "PERF_TICKS";

// Hot path reporting
pub const DEFAULT_TOP_PATHS: usize = 20;
pub const MAX_TOP_PATHS: usize = 1000;

// Flamegraph defaults
pub const DEFAULT_FLAMEGRAPH_TITLE: &str = "IgProf Call Tree";
pub const DEFAULT_FLAMEGRAPH_WIDTH: usize = 1200;
pub const FLAMEGRAPH_COUNT_NAME: &str = "ticks";

/// Environment variable that can supply the trace path to `convert`
pub const TRACE_PATH_ENV: &str = "IGPROF_TRACE";
