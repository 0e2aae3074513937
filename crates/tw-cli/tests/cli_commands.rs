//! End-to-end tests for the `tw` command-line interface.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STORY: &str = "\
The Lighthouse
# Start
METADATA: icon=🌊, color=#1e90ff
You wake on a rocky shore.
[Walk to the river -> River] [Climb the cliff => Cliff]

# River
The water is cold & clear.
[Rest -> Camp]

# Cliff
METADATA: color=notacolor
The wind howls.
";

/// Create a temp directory holding `Story.txt`.
fn story_dir(story: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Story.txt");
    fs::write(&path, story).unwrap();
    (dir, path)
}

fn tw() -> Command {
    Command::cargo_bin("tw").unwrap()
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

#[test]
fn build_writes_player() {
    let (dir, story) = story_dir(STORY);
    let output = dir.path().join("novel.html");

    tw().arg("build")
        .arg("-i")
        .arg(&story)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 scenes, 3 choices"))
        .stdout(predicate::str::contains("Story starts at 'Start'"));

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<script id=\"story-data\" type=\"application/json\">"));
    assert!(html.contains(
        "<script id=\"story-order\" type=\"application/json\">[\"Start\",\"River\",\"Cliff\"]</script>"
    ));
    assert!(!html.contains("<!-- story-data -->"));
    assert!(html.contains("\\u0026amp; clear"));
}

#[test]
fn build_records_entry_before_numeric_scene_ids() {
    let (dir, story) = story_dir("# Prologue\nIt begins.\n[On -> 1]\n# 1\nOne.\n# 2\nTwo.\n");
    let output = dir.path().join("novel.html");

    tw().arg("build")
        .arg("-i")
        .arg(&story)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Story starts at 'Prologue'"));

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("type=\"application/json\">[\"Prologue\",\"1\",\"2\"]</script>"));
}

#[test]
fn build_uses_default_file_names() {
    let (dir, _) = story_dir(STORY);

    tw().arg("build").current_dir(dir.path()).assert().success();

    assert!(dir.path().join("Interactive_novel.html").exists());
}

#[test]
fn build_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    tw().arg("build")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("Story.txt not found"));

    assert!(!dir.path().join("Interactive_novel.html").exists());
}

#[test]
fn build_without_headings_fails() {
    let (dir, story) = story_dir("Just some prose.\nNo scenes here.\n");
    let output = dir.path().join("novel.html");

    tw().arg("build")
        .arg("-i")
        .arg(&story)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scenes found"));

    assert!(!output.exists());
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_warnings_and_unwritten_targets() {
    let (_dir, story) = story_dir(STORY);

    tw().arg("check")
        .arg("-i")
        .arg(&story)
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"))
        .stdout(predicate::str::contains("River -> Camp"))
        .stderr(predicate::str::contains("invalid color format"))
        .stderr(predicate::str::contains("1 warning"));
}

#[test]
fn check_duplicate_scene_warns() {
    let (_dir, story) = story_dir("# Start\nOne.\n# start\nTwo.\n");

    tw().arg("check")
        .arg("-i")
        .arg(&story)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 scenes"))
        .stderr(predicate::str::contains("duplicate scene"));
}

// ---------------------------------------------------------------------------
// scenes
// ---------------------------------------------------------------------------

#[test]
fn scenes_lists_table() {
    let (_dir, story) = story_dir(STORY);

    tw().arg("scenes")
        .arg("-i")
        .arg(&story)
        .assert()
        .success()
        .stdout(predicate::str::contains("Start"))
        .stdout(predicate::str::contains("#1E90FF"))
        .stdout(predicate::str::contains("Camp?"))
        .stdout(predicate::str::contains("3 scenes"));
}

#[test]
fn scenes_reads_built_player() {
    let (dir, story) = story_dir(STORY);
    let output = dir.path().join("novel.html");
    tw().arg("build")
        .arg("-i")
        .arg(&story)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    tw().arg("scenes")
        .arg("-i")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cliff"))
        .stdout(predicate::str::contains("3 scenes"));
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn export_prints_story_json() {
    let (_dir, story) = story_dir(STORY);

    tw().arg("export")
        .arg("-i")
        .arg(&story)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Start\": {"))
        .stdout(predicate::str::contains("\"next\": \"River\""))
        .stdout(predicate::str::contains("<p>The water is cold &amp; clear.</p>"));
}

#[test]
fn export_to_file() {
    let (dir, story) = story_dir(STORY);
    let output = dir.path().join("story.json");

    tw().arg("export")
        .arg("-i")
        .arg(&story)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));

    let json = fs::read_to_string(&output).unwrap();
    assert!(json.contains("\"icon\": \"🌊\""));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_follows_choices_to_the_end() {
    let (dir, story) = story_dir(STORY);

    tw().arg("play")
        .arg("-i")
        .arg(&story)
        .arg("--saves")
        .arg(dir.path().join("saves.json"))
        .write_stdin("2\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("You wake on a rocky shore."))
        .stdout(predicate::str::contains("The wind howls."))
        .stdout(predicate::str::contains("[End of Story]"))
        .stdout(predicate::str::contains("Start Over"));
}

#[test]
fn play_reports_missing_scene() {
    let (dir, story) = story_dir(STORY);

    tw().arg("play")
        .arg("-i")
        .arg(&story)
        .arg("--saves")
        .arg(dir.path().join("saves.json"))
        .write_stdin("1\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("scene 'Camp' not found"));
}

#[test]
fn play_saves_to_file() {
    let (dir, story) = story_dir(STORY);
    let saves = dir.path().join("saves.json");

    tw().arg("play")
        .arg("-i")
        .arg(&story)
        .arg("--saves")
        .arg(&saves)
        .write_stdin("1\nsave by the river\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Game saved as 'by the river'!"));

    let content = fs::read_to_string(&saves).unwrap();
    assert!(content.contains("interactive_novel_saves"));
    assert!(content.contains("by the river"));
}

#[test]
fn play_loads_existing_slot() {
    let (dir, story) = story_dir(STORY);
    let saves = dir.path().join("saves.json");
    fs::write(
        &saves,
        r#"{"interactive_novel_saves": "[{\"id\":\"7\",\"name\":\"seeded\",\"timestamp\":0,\"sceneId\":\"river\"}]"}"#,
    )
    .unwrap();

    tw().arg("play")
        .arg("-i")
        .arg(&story)
        .arg("--saves")
        .arg(&saves)
        .write_stdin("slots\nload 7\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("seeded"))
        .stdout(predicate::str::contains("Game loaded: 'seeded'"))
        .stdout(predicate::str::contains("The water is cold & clear."));
}

#[test]
fn play_survives_corrupt_saves() {
    let (dir, story) = story_dir(STORY);
    let saves = dir.path().join("saves.json");
    fs::write(&saves, "{ this is not json").unwrap();

    tw().arg("play")
        .arg("-i")
        .arg(&story)
        .arg("--saves")
        .arg(&saves)
        .write_stdin("slots\ndelete 1\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved games."))
        .stdout(predicate::str::contains("save slot '1' not found"));
}
