// tests/watch_set.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::{fake_source, init_tracing, TestResult};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use devwatch::engine::{Coordinator, Interrupts};
use devwatch::fs::mock::MockFileSystem;
use devwatch::fs::{FileSystem, RealFileSystem};
use devwatch::types::StopSignal;
use devwatch::watch::collect_watch_dirs;

fn paths(raw: &[&str]) -> Vec<PathBuf> {
    raw.iter().map(PathBuf::from).collect()
}

fn sample_tree() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("./main.go", "package main");
    fs.add_dir("./src/api/v1");
    fs.add_file("./src/api/handler.go", "");
    fs.add_dir("./src/web");
    fs.add_dir("./.git/objects");
    fs.add_dir("./node_modules/left-pad");
    fs
}

#[test]
fn walk_lists_parents_before_children_in_lexical_order() -> TestResult {
    let fs = sample_tree();
    let cfg = ConfigFileBuilder::new().build();

    let dirs = collect_watch_dirs(&fs, Path::new("."), cfg.exclude_set())?;

    assert_eq!(
        dirs,
        paths(&[
            ".",
            "./.git",
            "./.git/objects",
            "./node_modules",
            "./node_modules/left-pad",
            "./src",
            "./src/api",
            "./src/api/v1",
            "./src/web",
        ])
    );
    Ok(())
}

#[test]
fn excluded_directories_are_skipped_with_their_subtree() -> TestResult {
    let fs = sample_tree();
    let cfg = ConfigFileBuilder::new()
        .with_exclude(".git")
        .with_exclude("node_*")
        .build();

    let dirs = collect_watch_dirs(&fs, Path::new("."), cfg.exclude_set())?;

    assert_eq!(
        dirs,
        paths(&[".", "./src", "./src/api", "./src/api/v1", "./src/web"])
    );
    Ok(())
}

#[test]
fn removed_subtree_is_not_walked() -> TestResult {
    let fs = sample_tree();
    fs.remove("./src/api");
    let cfg = ConfigFileBuilder::new().with_exclude(".git").build();

    let dirs = collect_watch_dirs(&fs, Path::new("."), cfg.exclude_set())?;
    assert_eq!(
        dirs,
        paths(&[".", "./node_modules", "./node_modules/left-pad", "./src", "./src/web"])
    );
    Ok(())
}

#[test]
fn root_is_always_watched() -> TestResult {
    let fs = MockFileSystem::new();
    let cfg = ConfigFileBuilder::new().with_exclude("*").build();

    let dirs = collect_watch_dirs(&fs, Path::new("."), cfg.exclude_set())?;
    assert_eq!(dirs, paths(&["."]));
    Ok(())
}

#[test]
fn unreadable_directory_fails_the_walk() {
    init_tracing();
    let fs = sample_tree();
    fs.deny_read("./src/api");
    let cfg = ConfigFileBuilder::new().build();

    let err = collect_watch_dirs(&fs, Path::new("."), cfg.exclude_set())
        .expect_err("walk should fail on an unreadable directory");
    assert!(err.to_string().contains("./src/api"), "unexpected error: {err}");
}

#[test]
fn walk_on_real_filesystem() -> TestResult {
    let tmp = tempfile::tempdir()?;
    std::fs::create_dir_all(tmp.path().join("b/inner"))?;
    std::fs::create_dir_all(tmp.path().join("a"))?;
    std::fs::create_dir_all(tmp.path().join("target/debug"))?;
    std::fs::write(tmp.path().join("a/file.txt"), "x")?;

    let cfg = ConfigFileBuilder::new().with_exclude("target").build();
    let dirs = collect_watch_dirs(&RealFileSystem, tmp.path(), cfg.exclude_set())?;

    let root = tmp.path().to_path_buf();
    assert_eq!(
        dirs,
        vec![root.clone(), root.join("a"), root.join("b"), root.join("b/inner")]
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() -> TestResult {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().to_path_buf();
    std::fs::create_dir_all(root.join("src"))?;
    std::fs::create_dir_all(root.join("vendor"))?;
    std::os::unix::fs::symlink("..", root.join("src/up"))?;
    std::os::unix::fs::symlink("..", root.join("src/up2"))?;
    std::os::unix::fs::symlink(root.join("vendor"), root.join("linked-vendor"))?;

    let cfg = ConfigFileBuilder::new().build();
    let dirs = collect_watch_dirs(&RealFileSystem, &root, cfg.exclude_set())?;

    assert_eq!(dirs, vec![root.clone(), root.join("src"), root.join("vendor")]);
    Ok(())
}

#[test]
fn mock_directory_links_are_skipped() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_dir("./src");
    fs.add_dir_link("./src/up", ".");

    assert!(fs.is_dir(Path::new("./src/up")));
    assert!(fs.is_symlink(Path::new("./src/up")));
    assert!(!fs.is_symlink(Path::new("./src")));

    let cfg = ConfigFileBuilder::new().build();
    let dirs = collect_watch_dirs(&fs, Path::new("."), cfg.exclude_set())?;
    assert_eq!(dirs, paths(&[".", "./src"]));
    Ok(())
}

#[tokio::test]
async fn coordinator_registers_every_directory_with_the_source() -> TestResult {
    init_tracing();
    let fs = sample_tree();
    let cfg = ConfigFileBuilder::new()
        .with_exclude(".git")
        .with_action("*.go", "", "")
        .with_action("*.css", "", "")
        .debug(true)
        .build();
    let (source, streams, handle) = fake_source();
    let (_stop, interrupts) = Interrupts::channel();

    let coordinator = Coordinator::new(
        &cfg,
        Path::new("."),
        source,
        streams,
        Arc::new(fs),
        interrupts,
    )?;

    assert_eq!(handle.watched(), coordinator.watched_dirs());
    assert_eq!(handle.watched().first(), Some(&PathBuf::from(".")));
    assert!(!handle.watched().iter().any(|p| p.starts_with("./.git")));

    let actions = coordinator.actions();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[1].index(), 1);
    assert_eq!(actions[1].pattern().as_str(), "*.css");

    coordinator.shutdown(StopSignal::Terminate).await?;
    assert!(handle.is_closed());
    Ok(())
}

#[tokio::test]
async fn failing_watch_registration_is_fatal() {
    let fs = sample_tree();
    let cfg = ConfigFileBuilder::new().build();
    let (source, streams, _handle) = fake_source();
    let source = source.fail_on("./src/web");
    let (_stop, interrupts) = Interrupts::channel();

    let result = Coordinator::new(
        &cfg,
        Path::new("."),
        source,
        streams,
        Arc::new(fs),
        interrupts,
    );

    let err = result.expect_err("registration failure must abort startup");
    assert!(err.to_string().contains("./src/web"), "unexpected error: {err}");
}

#[tokio::test]
async fn unreadable_tree_is_fatal_for_the_coordinator() {
    let fs = sample_tree();
    fs.deny_read(".");
    let cfg = ConfigFileBuilder::new().build();
    let (source, streams, handle) = fake_source();
    let (_stop, interrupts) = Interrupts::channel();

    let result = Coordinator::new(
        &cfg,
        Path::new("."),
        source,
        streams,
        Arc::new(fs),
        interrupts,
    );

    assert!(result.is_err());
    assert!(handle.watched().is_empty());
}
