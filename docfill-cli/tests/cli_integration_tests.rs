use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn docfill() -> Command {
    Command::cargo_bin("docfill").unwrap()
}

#[test]
fn test_parse_command_text() {
    let output = docfill()
        .args([
            "parse",
            "--text",
            r#"{"ho_ten":"X","ngay_sinh":"20250101"}"#,
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "json");
    assert_eq!(json["record"]["ho_ten"], "X");
    assert_eq!(json["record"]["ngay_sinh"], "01/01/2025");
}

#[test]
fn test_parse_command_requires_input() {
    let output = docfill().arg("parse").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Provide exactly one of --input or --text"));
}

#[test]
fn test_groups_command() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("mau.txt");
    fs::write(&template, "{so_cccd_1} {so_cccd_2} {ma_ho_so}").unwrap();

    let output = docfill()
        .args(["groups", "--template", template.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["slots"], serde_json::json!([1, 2]));
    assert_eq!(json["groups"][0]["base_key"], "so_cccd");
}

#[test]
fn test_fill_command_writes_output_and_state() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("mau.txt");
    let first = temp_dir.path().join("first.txt");
    let second = temp_dir.path().join("second.json");
    let output_file = temp_dir.path().join("out").join("filled.txt");
    let state_file = temp_dir.path().join("state.json");
    let config_file = temp_dir.path().join("docfill.toml");

    fs::write(&template, "{ho_ten_1}; {ngay_cap_1}; {gioi_tinh_1}").unwrap();
    fs::write(
        &first,
        "079090001234|123456789|Nguyễn Văn An|15/03/1990|Nam|Hà Nội|20/04/2021",
    )
    .unwrap();
    fs::write(&second, r#"{"ho_ten": "Trần Thị Bình"}"#).unwrap();
    fs::write(&config_file, "[merge]\ncleanup_base_on_numbered_fill = true\n").unwrap();

    let output = docfill()
        .args([
            "fill",
            "--template",
            template.to_str().unwrap(),
            "--data",
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "--slot",
            "1",
            "--config",
            config_file.to_str().unwrap(),
            "--output",
            output_file.to_str().unwrap(),
            "--state",
            state_file.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let filled = fs::read_to_string(&output_file).unwrap();
    assert_eq!(filled, "Trần Thị Bình; 20/04/2021; Nam");

    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&state_file).unwrap()).unwrap();
    assert_eq!(state["ho_ten_1"], "Trần Thị Bình");
    assert_eq!(state["ngay_cap_1"], "20/04/2021");
}

#[test]
fn test_fill_command_restrict_flag() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("mau.txt");
    let data = temp_dir.path().join("scan.json");
    fs::write(&template, "{ho_ten_1} / {dia_chi_1}").unwrap();
    fs::write(&data, r#"{"ho_ten": "Võ E"}"#).unwrap();

    let output = docfill()
        .args([
            "fill",
            "-t",
            template.to_str().unwrap(),
            "-d",
            data.to_str().unwrap(),
            "-s",
            "_1",
            "--restrict",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Võ E / {dia_chi_1}");
}

#[test]
fn test_fill_command_rejects_bad_slot() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("mau.txt");
    let data = temp_dir.path().join("scan.json");
    fs::write(&template, "{ho_ten}").unwrap();
    fs::write(&data, "{}").unwrap();

    let output = docfill()
        .args([
            "fill",
            "-t",
            template.to_str().unwrap(),
            "-d",
            data.to_str().unwrap(),
            "-s",
            "first",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid slot `first`"));
}
