use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use hierview_cli::{Args, FormatArg, ModeArg, run};

/// Demo documents live at the workspace root.
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: &Path, output: PathBuf, format: FormatArg, mode: ModeArg) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        format,
        mode: Some(mode),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_json_files(demos_dir());
    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();

    for demo in &demos {
        let stem = demo.file_stem().unwrap().to_string_lossy().to_string();
        for (format, extension) in [(FormatArg::Svg, "svg"), (FormatArg::Json, "json")] {
            for mode in [ModeArg::Tree, ModeArg::Nested] {
                let output = temp_dir
                    .path()
                    .join(format!("{stem}_{mode:?}.{extension}"));

                if let Err(e) = run(&args(demo, output.clone(), format, mode)) {
                    failed.push((demo.clone(), format!("{mode:?}/{format:?}: {e}")));
                } else if !output.exists() {
                    failed.push((demo.clone(), "no output written".to_string()));
                }
            }
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo run(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_json_files(demos_dir().join("errors"));
    assert!(!error_demos.is_empty(), "No error demos found in demos/errors/");

    for demo in &error_demos {
        let output = temp_dir.path().join("error.svg");
        let result = run(&args(demo, output, FormatArg::Svg, ModeArg::Tree));
        assert!(
            result.is_err(),
            "{} unexpectedly succeeded",
            demo.display()
        );
    }
}

#[test]
fn e2e_nested_json_has_parents() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("cpu.json");

    run(&args(
        &demos_dir().join("repeated_regs.json"),
        output.clone(),
        FormatArg::Json,
        ModeArg::Nested,
    ))
    .expect("Failed to render demo");

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    let elements = document["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 5);

    let ids: Vec<&str> = elements
        .iter()
        .map(|element| element["data"]["id"].as_str().unwrap())
        .collect();
    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), ids.len(), "ids must be unique: {ids:?}");

    assert!(elements[1]["data"]["parent"] == elements[0]["data"]["id"]);
    assert!(elements[2]["data"]["parent"] == elements[0]["data"]["id"]);
    assert!(elements[4]["data"]["parent"] == elements[3]["data"]["id"]);
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let result = run(&args(
        &demos_dir().join("does_not_exist.json"),
        temp_dir.path().join("out.svg"),
        FormatArg::Svg,
        ModeArg::Tree,
    ));
    assert!(result.is_err());
}
