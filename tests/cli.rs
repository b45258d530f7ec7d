use assert_cmd::{Command, cargo::cargo_bin_cmd};

use crate::utils::testfs::TestFs;

#[allow(unused)]
mod utils;

/// Command with the defaulting environment variables cleared.
fn dllfwd() -> Command {
    let mut cmd = cargo_bin_cmd!();
    cmd.env_remove("PROCESSOR_ARCHITECTURE")
        .env_remove("target_platform")
        .env("NO_COLOR", "1");
    cmd
}

fn stderr(cmd: &mut Command) -> String {
    let output = cmd.assert().failure().get_output().clone();
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn invalid_input_extension() {
    let fs = TestFs::new("cli/invalid_input_extension").unwrap();

    let stderr = stderr(
        dllfwd()
            .current_dir(fs.root())
            .args(["--machine", "x64", "--no-temp-dir", "input.txt", "output.dll"]),
    );

    assert!(
        stderr.contains("input.txt: expected a path ending in '.dll'"),
        "{stderr}"
    );
    assert!(!fs.exists("empty.c"), "no build step should have started");
}

#[test]
fn invalid_output_extension() {
    let stderr = stderr(dllfwd().args(["--machine", "x64", "input.dll", "output.so"]));
    assert!(
        stderr.contains("output.so: expected a path ending in '.dll'"),
        "{stderr}"
    );
}

#[test]
fn unknown_host_architecture() {
    let fs = TestFs::new("cli/unknown_host_architecture").unwrap();

    let stderr = stderr(
        dllfwd()
            .current_dir(fs.root())
            .env("PROCESSOR_ARCHITECTURE", "mips")
            .args(["--no-temp-dir", "input.dll", "output.dll"]),
    );

    assert!(stderr.contains("unknown architecture 'mips'"), "{stderr}");
    assert!(!fs.exists("empty.c"), "no build step should have started");
}

#[test]
fn unknown_target_platform_uses_host() {
    // the host architecture resolves, so the run reaches config validation
    let stderr = stderr(
        dllfwd()
            .env("PROCESSOR_ARCHITECTURE", "AMD64")
            .env("target_platform", "linux-64")
            .args(["input.dll", "output.so"]),
    );

    assert!(
        stderr.contains("ignoring unknown target platform 'linux-64'"),
        "{stderr}"
    );
    assert!(
        stderr.contains("output.so: expected a path ending in '.dll'"),
        "{stderr}"
    );
}

#[test]
fn unknown_target_platform_without_host() {
    let stderr = stderr(
        dllfwd()
            .env("target_platform", "linux-64")
            .args(["input.dll", "output.dll"]),
    );

    assert!(
        stderr.contains("unknown target platform 'linux-64'"),
        "{stderr}"
    );
}

#[test]
fn no_architecture() {
    let stderr = stderr(dllfwd().args(["input.dll", "output.dll"]));
    assert!(stderr.contains("pass --machine"), "{stderr}");
}

#[test]
fn unknown_machine_flag() {
    dllfwd()
        .args(["--machine", "mips", "input.dll", "output.dll"])
        .assert()
        .failure();
}

#[cfg(not(windows))]
#[test]
fn toolchain_not_found() {
    let fs = TestFs::new("cli/toolchain_not_found").unwrap();

    let stderr = stderr(
        dllfwd()
            .current_dir(fs.root())
            .env("PATH", fs.root())
            .args(["--machine", "x64", "input.dll", "output.dll"]),
    );

    assert!(stderr.contains("could not create"), "{stderr}");
    assert!(stderr.contains("only be located automatically on Windows"), "{stderr}");
}

#[test]
fn response_file() {
    let fs = TestFs::new("cli/response_file").unwrap();
    std::fs::write(fs.join_path("args.rsp"), "--machine x64\ninput.txt\noutput.dll\n").unwrap();

    let stderr = stderr(dllfwd().current_dir(fs.root()).arg("@args.rsp"));
    assert!(stderr.contains("input.txt: expected a path ending in '.dll'"), "{stderr}");
}

#[test]
fn version() {
    let output = dllfwd().arg("--version").assert().success().get_output().clone();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "{stdout}");
}

#[test]
fn help() {
    let output = dllfwd().arg("--help").assert().success().get_output().clone();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--no-temp-dir"), "{stdout}");
    assert!(stdout.contains("--machine"), "{stdout}");
}
