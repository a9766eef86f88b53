#![allow(dead_code, unused_imports)]

pub use devwatch_test_utils::builders;
pub use devwatch_test_utils::fake_source::{fake_source, FakeEventSource, FakeSourceHandle};
pub use devwatch_test_utils::scripts::{
    count_lines, process_gone, wait_for_lines, wait_for_pid, wait_until_gone, ScriptDir,
};
pub use devwatch_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
