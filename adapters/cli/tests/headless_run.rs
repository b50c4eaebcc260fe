use std::process::Command;

#[test]
fn one_wave_run_prints_a_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_card-defence"))
        .args(["--players", "1", "--waves", "1", "--seed", "3"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch the card-defence binary");
    assert!(output.status.success(), "run failed: {output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let last = stdout.lines().last().expect("a summary line");
    let summary: serde_json::Value = serde_json::from_str(last).expect("summary is json");

    assert_eq!(summary["room"], "headless");
    assert_eq!(summary["phase"], "lobby");
    assert_eq!(summary["wave"], 1);
    assert_eq!(summary["towers"], 7);
    let base_health = summary["base_health"].as_i64().expect("base health");
    assert!((93..=100).contains(&base_health));
}
