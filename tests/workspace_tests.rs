// Integration tests for the per-job workspace
//
// The workspace must be collision-free between jobs, removed recursively
// on close, and safe to close more than once.

use anyhow::Result;
use std::fs;
use tempfile::TempDir;
use transcribo::Workspace;

#[test]
fn test_open_creates_directory_under_root() -> Result<()> {
    let root = TempDir::new()?;

    let workspace = Workspace::open(root.path())?;

    assert!(workspace.dir().is_dir(), "workspace directory should exist");
    assert_eq!(workspace.dir().parent(), Some(root.path()));

    Ok(())
}

#[test]
fn test_concurrent_workspaces_never_collide() -> Result<()> {
    let root = TempDir::new()?;

    let a = Workspace::open(root.path())?;
    let b = Workspace::open(root.path())?;

    assert_ne!(a.dir(), b.dir(), "two jobs must not share a workspace");

    Ok(())
}

#[test]
fn test_close_removes_everything_recursively() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;

    let artifact = workspace.artifact_path("audio.wav");
    fs::write(&artifact, b"payload")?;
    let nested = workspace.dir().join("nested");
    fs::create_dir(&nested)?;
    fs::write(nested.join("segment.wav"), b"payload")?;

    let dir = workspace.dir().to_path_buf();
    workspace.close();

    assert!(!dir.exists(), "workspace should be gone after close");

    Ok(())
}

#[test]
fn test_close_is_idempotent() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let dir = workspace.dir().to_path_buf();

    workspace.close();
    assert!(!dir.exists());

    // Second close must not panic or error.
    workspace.close();

    Ok(())
}

#[test]
fn test_drop_sweeps_unclosed_workspace() -> Result<()> {
    let root = TempDir::new()?;

    let dir = {
        let workspace = Workspace::open(root.path())?;
        fs::write(workspace.artifact_path("audio.wav"), b"payload")?;
        workspace.dir().to_path_buf()
    };

    assert!(!dir.exists(), "drop should remove an unclosed workspace");

    Ok(())
}

#[test]
fn test_artifact_path_stays_inside_workspace() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;

    let path = workspace.artifact_path("segment-000.wav");
    assert_eq!(path.parent(), Some(workspace.dir()));

    Ok(())
}
