//! Drive both command front ends the way a user would: dump, edit, generate.

use std::{ffi::OsStr, fs};

use clap::Parser;
use vfstatic_cli::{
    EXIT_ALL_FAILED, EXIT_PARTIAL_FAILURE, dump_config::DumpConfigArgs, exit_status,
    generate::GenerateArgs,
};
use vfstatic_core::{BatchStatus, Configuration};

#[test]
fn dump_edit_generate() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("Vazirmatn.ttf");
    fs::write(&font, font_test_data::VAZIRMATN_VAR).unwrap();
    let configs = dir.path().join("configs");
    let output = dir.path().join("static");

    let dump = DumpConfigArgs::try_parse_from([
        OsStr::new("vf-dump-config"),
        OsStr::new("-o"),
        configs.as_os_str(),
        font.as_os_str(),
    ])
    .unwrap();
    let config_path = dump.run().unwrap();

    let mut config = Configuration::load(&config_path).unwrap();
    config.font_name = "Demo".into();
    config.variants = Configuration::from_json(
        r#"{"file": "", "font_name": "", "axes": {},
            "variants": {"Light": {"wght": 300}, "Heavy": {"slnt": -10}}}"#,
    )
    .unwrap()
    .variants;
    config.save(&config_path).unwrap();

    let generate = GenerateArgs::try_parse_from([
        OsStr::new("vf-generate"),
        OsStr::new("-o"),
        output.as_os_str(),
        config_path.as_os_str(),
    ])
    .unwrap();
    let report = generate.run().unwrap();

    assert_eq!(report.status(), BatchStatus::PartialFailure);
    assert_eq!(exit_status(report.status()), EXIT_PARTIAL_FAILURE);
    assert!(output.join("Demo-Light.ttf").exists());
    assert!(!output.join("Demo-Heavy.ttf").exists());
}

#[test]
fn all_failed_maps_to_its_own_exit_status() {
    assert_eq!(exit_status(BatchStatus::AllFailed), EXIT_ALL_FAILED);
}

#[test]
fn dump_of_missing_font_fails_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.ttf");
    let args = DumpConfigArgs { font: missing, output_dir: dir.path().into(), from_instances: false };

    let err = args.run().unwrap_err();

    assert!(format!("{err:#}").contains("Failed to dump configuration"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
