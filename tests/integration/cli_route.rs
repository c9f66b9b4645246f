//! Integration tests for CLI routing

use super::test_utils::SHOP_CATALOG;
use fixtree::cli::{map_error, Commands, OutputFormat, RunContext};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("catalog.toml"), SHOP_CATALOG).unwrap();
    fs::write(temp_dir.path().join("fixtree.toml"), "[generation]\nretry_budget = 5\n").unwrap();
    temp_dir
}

fn context(temp_dir: &TempDir) -> RunContext {
    RunContext::new(
        temp_dir.path().to_path_buf(),
        Some(temp_dir.path().join("fixtree.toml")),
    )
    .unwrap()
}

fn sample(ty: &str, seed: u64, count: usize) -> Commands {
    Commands::Sample {
        catalog: PathBuf::from("catalog.toml"),
        ty: ty.to_string(),
        seed: Some(seed),
        count,
        pretty: false,
    }
}

/// Test that sample output is reproducible JSON
#[test]
fn test_sample_outputs_json() {
    let temp_dir = workspace();
    let ctx = context(&temp_dir);
    assert_eq!(ctx.config().generation.retry_budget, 5);

    let out = ctx.execute(&sample("Order", 3, 1)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(json["id"].is_string());
    assert_eq!(out, ctx.execute(&sample("Order", 3, 1)).unwrap());

    let batch: serde_json::Value =
        serde_json::from_str(&ctx.execute(&sample("Shape", 3, 4)).unwrap()).unwrap();
    assert_eq!(batch.as_array().unwrap().len(), 4);
}

/// Test resolve and candidates in json format
#[test]
fn test_resolve_and_candidates() {
    let temp_dir = workspace();
    let ctx = context(&temp_dir);

    let out = ctx
        .execute(&Commands::Resolve {
            catalog: PathBuf::from("catalog.toml"),
            ty: "Shape".to_string(),
            format: OutputFormat::Json,
        })
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["total"], 3);

    let out = ctx
        .execute(&Commands::Candidates {
            catalog: PathBuf::from("catalog.toml"),
            ty: "Order".to_string(),
            format: OutputFormat::Text,
        })
        .unwrap();
    assert!(out.contains("$.lines"));
    assert!(out.contains("Total: 4 candidate(s)"));
}

/// Test that unknown types map to a stable message
#[test]
fn test_unknown_type_message() {
    let temp_dir = workspace();
    let err = context(&temp_dir)
        .execute(&sample("Missing", 1, 1))
        .unwrap_err();
    assert_eq!(
        map_error(&err),
        "error: type 'Missing' is not defined in the catalog"
    );
}
