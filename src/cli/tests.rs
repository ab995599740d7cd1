//! Unit tests for CLI commands

use crate::cli::{run_with_output, Cli, Commands, OutputFormat};
use crate::runtime_config::RuntimeConfig;
use clap::Parser;
use std::io::Write;

const MANIFEST: &str = r#"
modules:
  - name: ScriptCs.Core
    identifier: "ScriptCs.Core, Version=0.9.0.0"
    types:
      - name: ScriptCs.HostController
        capabilities: [http-controller]
  - name: Acme.Api
    identifier: "Acme.Api, Version=1.0.0.0"
    types:
      - name: Acme.Api.OrdersController
        capabilities: [http-controller]
  - name: Broken
    identifier: "Broken, Version=0.1.0.0"
    failure:
      reason: "missing dependency"
"#;

fn manifest_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run_with_output(cli, RuntimeConfig::default(), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_discover_command_parses() {
    let cli = Cli::try_parse_from([
        "webapi-pack",
        "discover",
        "--manifest",
        "modules.yaml",
        "--module",
        "A",
        "--module",
        "B",
        "--format",
        "json",
    ])
    .unwrap();

    match cli.command {
        Commands::Discover {
            manifest,
            modules,
            capability,
            format,
        } => {
            assert_eq!(manifest.to_string_lossy(), "modules.yaml");
            assert_eq!(modules, vec!["A", "B"]);
            assert_eq!(capability, None);
            assert_eq!(format, OutputFormat::Json);
        }
        _ => panic!("Expected Discover command"),
    }
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["webapi-pack", "discover", "--manifest", "m.yaml"],
        vec!["webapi-pack", "discover", "-m", "m.json", "--capability", "api"],
        vec!["webapi-pack", "routes", "--manifest", "m.yaml", "--json-only"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
    assert!(Cli::try_parse_from(["webapi-pack", "discover"]).is_err());
}

#[test]
fn test_discover_text_report() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let report = run(&["webapi-pack", "discover", "--manifest", path]).unwrap();

    assert!(report.contains("controllers: 1"));
    assert!(report.contains("  Acme.Api.OrdersController"));
    assert!(!report.contains("ScriptCs.HostController"));
    assert!(report.contains("failures: 1"));
    assert!(report.contains("Broken, Version=0.1.0.0: missing dependency"));
}

#[test]
fn test_discover_explicit_module_skips_filtering() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let report = run(&[
        "webapi-pack",
        "discover",
        "--manifest",
        path,
        "--module",
        "ScriptCs.Core",
        "--format",
        "json",
    ])
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    let handlers: Vec<&str> = value["handlers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h.as_str().unwrap())
        .collect();
    assert_eq!(handlers, vec!["ScriptCs.HostController", "Acme.Api.OrdersController"]);
}

#[test]
fn test_unknown_module_is_an_error() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let err = run(&["webapi-pack", "discover", "--manifest", path, "--module", "Nope"]).unwrap_err();
    assert!(err.to_string().contains("module 'Nope' is not in the manifest"));
}

#[test]
fn test_routes_report() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let report = run(&["webapi-pack", "routes", "--manifest", path, "--json-only"]).unwrap();

    assert!(report.starts_with("base address: http://localhost:8080\n"));
    assert!(report.contains("  DefaultApi -> api/{controller}/{id}"));
    assert!(report.contains("  Acme.Api.OrdersController"));
    assert!(report.contains("  application/json, text/json"));
    assert!(!report.contains("x-www-form-urlencoded"));
}

#[test]
fn test_routes_report_uses_configured_base_address() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["webapi-pack", "routes", "--manifest", path]).unwrap();
    let config = RuntimeConfig {
        base_address: "http://0.0.0.0:9000".into(),
        json_only: true,
        ..RuntimeConfig::default()
    };
    let mut out = Vec::new();
    run_with_output(cli, config, &mut out).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.contains("base address: http://0.0.0.0:9000"));
    assert!(!report.contains("x-www-form-urlencoded"));
}

#[test]
fn test_routes_without_controllers_fails() {
    let file = manifest_file();
    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["webapi-pack", "routes", "--manifest", path]).unwrap();
    let config = RuntimeConfig {
        handler_capability: "none".into(),
        ..RuntimeConfig::default()
    };
    let err = run_with_output(cli, config, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("does not contain any controllers"));
}
