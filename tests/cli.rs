use assert_cmd::Command;

#[test]
fn help_lists_configuration_flags() {
    let output = Command::cargo_bin("excel-mcp-server")
        .expect("binary")
        .arg("--help")
        .output()
        .expect("run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--excel-files-path", "--transport", "--http-bind", "--resource-timeout-ms"] {
        assert!(stdout.contains(flag), "missing {flag} in:\n{stdout}");
    }
}

#[test]
fn unknown_transport_is_rejected() {
    let output = Command::cargo_bin("excel-mcp-server")
        .expect("binary")
        .args(["--transport", "carrier-pigeon"])
        .output()
        .expect("run binary");
    assert!(!output.status.success());
}
