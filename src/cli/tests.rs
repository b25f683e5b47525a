//! Unit tests for CLI commands

use std::fs;
use std::path::Path;

use crate::cli::{run_cli, Cli, Commands, OutputFormat};
use clap::Parser;

fn run(args: &[&str]) -> (bool, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let ok = run_cli(&cli, &mut out).unwrap();
    (ok, String::from_utf8(out).unwrap())
}

fn touch(root: &Path, relative: &str) {
    let file = root.join(relative);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, "").unwrap();
}

fn handler_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "Get.rs");
    touch(dir.path(), "FooItem/GetFooItem.rs");
    touch(dir.path(), "FooItem/PostFooItem.rs");
    touch(dir.path(), "FooItem/Edit/GetFooItemEdit.rs");
    touch(dir.path(), "FooItem/helpers.txt");
    fs::write(
        dir.path().join("manifest.yaml"),
        "namespace: App::Http\n\
         handlers:\n  \
           App::Http::Get: []\n  \
           App::Http::FooItem::GetFooItem:\n    - { name: id, type: int }\n  \
           App::Http::FooItem::PostFooItem: []\n  \
           App::Http::FooItem::Edit::GetFooItemEdit:\n    - { name: id, type: int }\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_dump_command_parses() {
    let cli = Cli::try_parse_from([
        "autoroute",
        "dump",
        "App::Http",
        "src/http",
        "--base-url",
        "/api",
        "--format",
        "json",
    ])
    .unwrap();

    match cli.command {
        Commands::Dump {
            registry,
            routing,
            format,
        } => {
            assert_eq!(registry.namespace, "App::Http");
            assert_eq!(registry.directory.to_string_lossy(), "src/http");
            assert_eq!(registry.method, "__invoke");
            assert_eq!(routing.base_url, "/api");
            assert_eq!(format, OutputFormat::Json);
        }
        _ => panic!("Expected Dump command"),
    }
}

#[test]
fn test_verbs_are_validated() {
    let cli = Cli::try_parse_from(["autoroute", "route", "App", "dir", "get", "/"]).unwrap();
    match cli.command {
        Commands::Route { verb, .. } => assert_eq!(verb, http::Method::GET),
        _ => panic!("Expected Route command"),
    }
    assert!(Cli::try_parse_from(["autoroute", "route", "App", "dir", "G E T", "/"]).is_err());
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["autoroute", "dump", "App", "dir"],
        vec!["autoroute", "create", "App", "dir", "GET", "/foo/{id}", "--suffix", "Action"],
        vec!["autoroute", "route", "App", "dir", "GET", "/foo/1", "--trace"],
        vec!["autoroute", "generate", "App", "dir", "App::Foo::GetFoo", "1", "2"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_dump_with_manifest() {
    let dir = handler_tree();
    let root = dir.path().to_string_lossy().to_string();
    let manifest = dir.path().join("manifest.yaml").to_string_lossy().to_string();
    let (ok, out) = run(&[
        "autoroute", "dump", "App::Http", &root, "--base-url", "/api", "--manifest", &manifest,
    ]);
    assert!(ok);
    assert_eq!(
        out,
        "GET     /api\n        App::Http::Get\n\
         HEAD    /api\n        App::Http::Get\n\
         POST    /api/foo-item\n        App::Http::FooItem::PostFooItem\n\
         GET     /api/foo-item/{int:id}\n        App::Http::FooItem::GetFooItem\n\
         HEAD    /api/foo-item/{int:id}\n        App::Http::FooItem::GetFooItem\n\
         GET     /api/foo-item/{int:id}/edit\n        App::Http::FooItem::Edit::GetFooItemEdit\n\
         HEAD    /api/foo-item/{int:id}/edit\n        App::Http::FooItem::Edit::GetFooItemEdit\n"
    );
}

#[test]
fn test_dump_without_manifest_uses_bare_paths() {
    let dir = handler_tree();
    let root = dir.path().to_string_lossy().to_string();
    let (ok, out) = run(&["autoroute", "dump", "App::Http", &root, "--format", "json"]);
    assert!(ok);
    let table: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(table["/foo-item"]["Get"], "App::Http::FooItem::GetFooItem");
    assert_eq!(table["/foo-item/edit"]["Head"], "App::Http::FooItem::Edit::GetFooItemEdit");
}

#[test]
fn test_route_text_and_failure() {
    let dir = handler_tree();
    let root = dir.path().to_string_lossy().to_string();
    let manifest = dir.path().join("manifest.yaml").to_string_lossy().to_string();

    let (ok, out) = run(&[
        "autoroute", "route", "App::Http", &root, "--manifest", &manifest, "GET", "/foo-item/42/edit",
    ]);
    assert!(ok);
    assert_eq!(out, "App::Http::FooItem::Edit::GetFooItemEdit::__invoke()\n    0: 42\n");

    let (ok, out) = run(&[
        "autoroute", "route", "App::Http", &root, "--manifest", &manifest, "PUT", "/foo-item",
    ]);
    assert!(!ok);
    assert_eq!(out, "PUT action not found in namespace App::Http::FooItem\n");
}

#[test]
fn test_route_json() {
    let dir = handler_tree();
    let root = dir.path().to_string_lossy().to_string();
    let manifest = dir.path().join("manifest.yaml").to_string_lossy().to_string();
    let (ok, out) = run(&[
        "autoroute", "route", "App::Http", &root, "--manifest", &manifest, "--format", "json", "GET",
        "/foo-item/z",
    ]);
    assert!(!ok);
    let route: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(route["error_kind"], "InvalidArgument");
    assert_eq!(route["handler_id"], "App::Http::FooItem::GetFooItem");
    assert!(route["trace"].as_array().is_some_and(|steps| !steps.is_empty()));
}

#[test]
fn test_generate() {
    let dir = handler_tree();
    let root = dir.path().to_string_lossy().to_string();
    let manifest = dir.path().join("manifest.yaml").to_string_lossy().to_string();
    let (ok, out) = run(&[
        "autoroute", "generate", "App::Http", &root, "--manifest", &manifest, "--base-url", "/api",
        "App::Http::FooItem::Edit::GetFooItemEdit", "7",
    ]);
    assert!(ok);
    assert_eq!(out, "/api/foo-item/7/edit\n");
}

#[test]
fn test_generate_errors_propagate() {
    let dir = handler_tree();
    let root = dir.path().to_string_lossy().to_string();
    let manifest = dir.path().join("manifest.yaml").to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "autoroute", "generate", "App::Http", &root, "--manifest", &manifest,
        "App::Http::FooItem::GetFooItem", "1", "2",
    ])
    .unwrap();
    let err = run_cli(&cli, &mut Vec::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Too many arguments provided for App::Http::FooItem::GetFooItem"
    );
}

#[test]
fn test_missing_directory() {
    let cli = Cli::try_parse_from(["autoroute", "dump", "App", "/no/such/dir"]).unwrap();
    let err = run_cli(&cli, &mut Vec::new()).unwrap_err();
    assert_eq!(err.to_string(), "Directory /no/such/dir not found.");
}

#[test]
fn test_create_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_string_lossy().to_string();
    let args = [
        "autoroute", "create", "App::Http", &root, "GET", "/company/{companyId}", "--suffix", "Action",
    ];

    let (ok, out) = run(&args);
    assert!(ok);
    let file = dir.path().join("Company").join("GetCompanyAction.rs");
    assert_eq!(out, format!("{}\n", file.display()));
    assert!(fs::read_to_string(&file).unwrap().contains("pub fn __invoke(&self, companyId: String)"));

    let (ok, out) = run(&args);
    assert!(!ok);
    assert_eq!(out, format!("{}\nAlready exists; not overwriting.\n", file.display()));
}

#[test]
fn test_create_with_missing_template() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "autoroute", "create", "App", &root, "GET", "/x", "--template", "/no/such.tpl",
    ])
    .unwrap();
    let err = run_cli(&cli, &mut Vec::new()).unwrap_err();
    assert_eq!(err.to_string(), "Template file /no/such.tpl does not exist.");
}

#[test]
fn test_create_rejects_dot_segments() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("http");
    fs::create_dir(&root).unwrap();
    let root_arg = root.to_string_lossy().to_string();
    let cli = Cli::try_parse_from(["autoroute", "create", "App", &root_arg, "GET", "/../escape"]).unwrap();
    let err = run_cli(&cli, &mut Vec::new()).unwrap_err();
    assert_eq!(err.to_string(), "Directory dots not allowed in segments");
    assert!(!dir.path().join("Escape").exists());
    assert!(!dir.path().join("GetEscape.rs").exists());
}
