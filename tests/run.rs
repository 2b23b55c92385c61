use std::fs::File;
use std::io::Write;
use std::path::Path;

use phi_info::package::{GLOBAL_GAME_MANAGERS, GLOBAL_METADATA, IL2CPP_BINARY, LEVEL0};
use phi_info::{ExtractConfig, ExtractError, RunOptions};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn write_package(path: &Path, entries: &[&str]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for name in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(b"payload").unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn missing_entry_writes_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("Phigros.apk");
    write_package(&package, &[GLOBAL_GAME_MANAGERS, LEVEL0, GLOBAL_METADATA]);

    let output = dir.path().join("output");
    let err = phi_info::run(&RunOptions {
        package,
        output: output.clone(),
        config: ExtractConfig::default(),
    })
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::MissingArchiveEntry {
            path: IL2CPP_BINARY
        })
    ));
    assert!(!output.exists());
}

#[test]
fn missing_package_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output");
    let err = phi_info::run(&RunOptions {
        package: dir.path().join("missing.apk"),
        output: output.clone(),
        config: ExtractConfig::default(),
    })
    .unwrap_err();

    assert!(err.to_string().contains("missing.apk"));
    assert!(!output.exists());
}

#[test]
fn not_a_zip_fails() {
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("broken.apk");
    std::fs::write(&package, b"definitely not a zip archive").unwrap();

    let output = dir.path().join("output");
    let result = phi_info::run(&RunOptions {
        package,
        output: output.clone(),
        config: ExtractConfig::default(),
    });
    assert!(result.is_err());
    assert!(!output.exists());
}
