use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_coveo_export"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("run CLI")
}

#[test]
fn stdout_export_has_header_and_one_row_per_result() {
    let input = fixture("search_response.json");
    let output = run(&["--input", input.to_str().unwrap(), "--stdout"]);
    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.trim_end_matches('\n').split('\n').collect();
    assert_eq!(lines.len(), 3);

    let header = lines[0];
    assert!(header.starts_with("\"Title\",\"URI\",\"Score\""));
    assert!(header.contains("\"RI_QRE_Expression_source__Docs\""));
    assert!(header.contains("\"Term_guide_URI\""));
    assert!(header.contains("\"Term_setup_N1\""));
    assert!(!header.contains("Term_setup_URI"));

    assert!(lines[1].starts_with(
        "\"Getting \"\"started\"\" guide\",\"https://docs.example.com/start\",4735,4735,1550,6285,100,\"\",false,800,180,405,0,500,350,2500,0,2500,"
    ));
    assert!(lines[2].starts_with(
        "\"Release notes\",\"https://docs.example.com/notes\",1200,0,0,0,25.5,\"Boosted\",true,"
    ));
}

#[test]
fn file_export_uses_timestamped_name() {
    let input = fixture("search_response.json");
    let out = tempfile::tempdir().expect("tempdir");
    let output = run(&[
        "--input",
        input.to_str().unwrap(),
        "--output-dir",
        out.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let written: Vec<PathBuf> = fs::read_dir(out.path())
        .expect("read dir")
        .map(|e| e.expect("entry").path())
        .collect();
    assert_eq!(written.len(), 1);

    let name = written[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("coveo_export_"));
    assert!(name.ends_with("Z.csv"));
    assert!(!name.contains(':'));

    let contents = fs::read_to_string(&written[0]).expect("read export");
    assert_eq!(contents.split('\n').count(), 3);
    assert!(!contents.ends_with('\n'));
}

#[test]
fn payload_without_results_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("empty.json");
    fs::write(&input, r#"{"totalCount": 0}"#).expect("write fixture");

    let output = run(&["--input", input.to_str().unwrap(), "--stdout"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No results in response"));
    assert!(output.stdout.is_empty());
}
