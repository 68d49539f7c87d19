use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("library-cli").unwrap();
    cmd.env("LIBRARY_ENV", "local")
        .env("LIBRARY_CONFIG_DIR", std::env::temp_dir().join("library-cli-no-config"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = cli().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("openapi"));
}

#[test]
fn openapi_prints_book_routes() {
    let output = cli().arg("openapi").output().unwrap();
    assert!(output.status.success());

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let paths = document["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/authors/{authorId}/books"));
    assert!(paths.contains_key("/api/authors/{authorId}/books/{bookId}"));
    assert!(document["components"]["schemas"]["BookForUpdate"].is_object());
}

#[test]
fn unknown_environment_fails() {
    let output = cli().env("LIBRARY_ENV", "qa").arg("config").output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported environment"));
}
