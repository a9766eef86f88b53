// tests/demo_configs.rs

mod common;
use crate::common::{init_tracing, TestResult};

use std::path::PathBuf;
use std::time::Duration;

use devwatch::config::{load_and_validate, ConfigFormat, DEFAULT_GRACE_PERIOD_MS};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn go_web_demo_loads() -> TestResult {
    init_tracing();

    let path = demo("go-web.json");
    assert_eq!(ConfigFormat::from_path(&path), ConfigFormat::Json);
    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.actions.len(), 3);
    let go = &cfg.actions[0];
    assert_eq!(go.run.as_ref().map(|r| r.program()), Some("./bin/server"));

    let tmpl = &cfg.actions[1];
    assert!(tmpl.build.is_none() && tmpl.run.is_none());

    assert_eq!(cfg.post_hooks.len(), 1);
    assert_eq!(cfg.post_hooks[0].program(), "npx");
    assert_eq!(cfg.grace_period, Duration::from_millis(DEFAULT_GRACE_PERIOD_MS));
    Ok(())
}

#[test]
fn rust_service_demo_loads() -> TestResult {
    let path = demo("rust-service.toml");
    assert_eq!(ConfigFormat::from_path(&path), ConfigFormat::Toml);
    let cfg = load_and_validate(&path)?;

    assert!(cfg.debug);
    assert_eq!(cfg.grace_period, Duration::from_millis(1500));
    assert!(cfg.exclude_set().is_match("node_modules"));
    assert!(cfg.exclude_set().is_match("target"));

    let service = &cfg.actions[0];
    let run = service.run.as_ref().ok_or("service has a run command")?;
    assert_eq!(run.args(), ["--port", "3000"]);

    let manifest = &cfg.actions[1];
    assert_eq!(manifest.pattern, "Cargo.toml");
    assert!(manifest.run.is_none());
    Ok(())
}
