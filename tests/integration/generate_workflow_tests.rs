/*!
 * Integration tests for mirroring a source tree into reference stubs
 */

use std::fs;
use anyhow::Result;
use prismdocs::app_config::{Config, StubConfig};
use prismdocs::app_controller::Controller;
use prismdocs::stub_generator::StubGenerator;
use crate::common;

/// Test a full run over a small annotated tree
#[test]
fn test_generate_withAnnotatedTree_shouldMirrorEveryFile() -> Result<()> {
    common::init_test_logging();
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    common::create_annotated_tree(input_dir.path())?;

    let controller = Controller::with_config(Config::default())?;
    let summary = controller.run_generate(input_dir.path(), output_dir.path(), false)?;

    assert_eq!(summary.stubs, 2);
    assert_eq!(summary.copies, 2);
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.collisions, 0);

    let out = output_dir.path();
    assert_eq!(
        fs::read_to_string(out.join("actor.rst"))?,
        "Actor\n=====\n\n.. lua:autoobject:: Actor\n   :members:\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("core/cell.rst"))?,
        "Cell\n====\n\n.. lua:autoobject:: Cell\n   :members:\n"
    );
    assert_eq!(fs::read(out.join("core/util.rst"))?, b"local M = {}\r\nreturn M\r\n");
    assert_eq!(fs::read_to_string(out.join("README.rst"))?, "Sources for the engine.\n");

    assert!(!out.join("actor.lua").exists());
    Ok(())
}

/// Test that an output directory that does not exist yet is created
#[test]
fn test_generate_withMissingOutputDir_shouldCreateIt() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let scratch = common::create_temp_dir()?;
    common::create_test_file(input_dir.path(), "one.lua", "--- @class One\n")?;
    let output_dir = scratch.path().join("docs").join("api");

    let summary = StubGenerator::new(StubConfig::default())?.generate(input_dir.path(), &output_dir)?;

    assert_eq!(summary.stubs, 1);
    assert!(output_dir.join("one.rst").is_file());
    Ok(())
}

/// Test that a missing input directory aborts the run
#[test]
fn test_generate_withMissingInputDir_shouldFail() -> Result<()> {
    let scratch = common::create_temp_dir()?;

    let result = StubGenerator::new(StubConfig::default())?
        .generate(scratch.path().join("nope"), scratch.path().join("out"));

    assert!(result.is_err());
    assert!(!scratch.path().join("out").exists());
    Ok(())
}

/// Test that an empty input tree writes nothing
#[test]
fn test_generate_withEmptyTree_shouldReportZeroFiles() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;

    let summary = StubGenerator::new(StubConfig::default())?.generate(input_dir.path(), output_dir.path())?;

    assert_eq!(summary.total(), 0);
    assert_eq!(fs::read_dir(output_dir.path())?.count(), 0);
    Ok(())
}

/// Test that rerunning overwrites earlier output
#[test]
fn test_generate_twice_shouldOverwritePreviousOutput() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    let source = common::create_test_file(input_dir.path(), "door.lua", "--- @class Door\n")?;

    let generator = StubGenerator::new(StubConfig::default())?;
    generator.generate(input_dir.path(), output_dir.path())?;
    fs::write(&source, "--- @class Gate\n")?;
    generator.generate(input_dir.path(), output_dir.path())?;

    let stub = fs::read_to_string(output_dir.path().join("door.rst"))?;
    assert!(stub.starts_with("Gate\n====\n"));
    Ok(())
}

/// Test that the configured extension and domain are applied
#[test]
fn test_generate_withCustomConfig_shouldUseExtensionAndDomain() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    common::create_test_file(input_dir.path(), "widget.py", "# @class Widget\nclass Widget: pass\n")?;

    let mut config = Config::default();
    config.stubs.object_domain = "py".to_string();
    config.stubs.output_extension = "txt".to_string();
    let controller = Controller::with_config(config)?;

    controller.run_generate(input_dir.path(), output_dir.path(), false)?;

    let stub = fs::read_to_string(output_dir.path().join("widget.txt"))?;
    assert!(stub.contains(".. py:autoobject:: Widget\n   :members:\n"));
    Ok(())
}

/// Test that an invalid configuration is rejected before any work happens
#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.stubs.marker = String::new();

    assert!(Controller::with_config(config).is_err());
}

/// Test that inputs mapping to the same output are counted and the later one wins
#[test]
fn test_generate_withCollidingOutputs_shouldCountCollision() -> Result<()> {
    common::init_test_logging();
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    common::create_test_file(input_dir.path(), "a.lua", "--- @class A\n")?;
    common::create_test_file(input_dir.path(), "a.txt", "plain notes\n")?;
    common::create_test_file(input_dir.path(), "b.lua", "--- @class B\n")?;

    let summary = StubGenerator::new(StubConfig::default())?.generate(input_dir.path(), output_dir.path())?;

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.collisions, 1);
    assert_eq!(fs::read_to_string(output_dir.path().join("a.rst"))?, "plain notes\n");
    assert_eq!(fs::read_dir(output_dir.path())?.count(), 2);
    Ok(())
}
