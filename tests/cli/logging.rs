//! Verbosity and log filtering.

use crate::support::*;

#[test]
fn test_quiet_by_default() {
    skip_without_git!();
    let t = Test::with_secrets(&[("svc", "v")]);

    let output = t.get("svc");
    assert_success(&output);
    let err = stderr(&output);
    assert!(!err.contains("DEBUG") && !err.contains("INFO"), "{}", err);
}

#[test]
fn test_verbose_flag_enables_debug() {
    skip_without_git!();
    let t = Test::with_secrets(&[("svc", "v")]);

    let output = t.stowage(&["--verbose", "get", "svc"]);
    assert_success(&output);
    assert_stderr_contains(&output, "DEBUG");
    assert_stderr_contains(&output, "store opened");
    assert_eq!(stdout(&output), "v\n");
}

#[test]
fn test_log_env_overrides_verbosity() {
    skip_without_git!();
    let t = Test::with_secrets(&[("svc", "v")]);

    let output = t
        .cmd()
        .env("STOWAGE_LOG", "stowage=info")
        .args(["add", "svc", "w"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stderr_contains(&output, "INFO");
    assert_stderr_contains(&output, "adding secret");
    assert!(!stderr(&output).contains("DEBUG"));
}
