//! Integration tests for settings persistence

use pretty_assertions::assert_eq;
use promptfold_core::{FoldRegistry, FoldSession};
use promptfold_settings::{ModeSettings, PromptFoldSettings};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let settings = PromptFoldSettings::load_from(dir.path().join("settings.json")).unwrap();
    assert_eq!(settings, PromptFoldSettings::default());
}

#[test]
fn test_settings_persistence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = PromptFoldSettings::default();
    settings.fold.blank_lines = 2;
    settings.fold.indicator = Some("triangle".to_string());
    settings.modes.insert(
        "irb".to_string(),
        ModeSettings::with_host_prompt(r"^irb\(main\):\d+:\d+> ", "#"),
    );
    settings.save_to(&path).unwrap();

    assert!(path.exists());
    let loaded = PromptFoldSettings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_user_modes_merge_with_builtins() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "modes": {
                "shell": { "host_prompt": "^% ", "blank_lines": 1 },
                "sqlite": { "host_prompt": "^sqlite> " }
            }
        }"#,
    )
    .unwrap();

    let settings = PromptFoldSettings::load_from(&path).unwrap();
    assert_eq!(
        settings.mode_names(),
        vec!["ghci", "node", "python", "shell", "sqlite"]
    );

    let shell = settings.resolve("shell");
    assert_eq!(shell.host_prompt.as_deref(), Some("^% "));
    assert_eq!(shell.config.blank_lines, 1);
    assert_eq!(shell.config.comment_lead, None);
}

#[test]
fn test_invalid_json_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    let err = PromptFoldSettings::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse settings JSON"));
}

#[test]
fn test_resolved_mode_drives_a_session() {
    let settings = PromptFoldSettings::default();
    let mut registry = FoldRegistry::new();

    let python = settings.resolve("python");
    let mut session = FoldSession::new(&python.mode, python.config);
    let spec = session
        .setup(&mut registry, python.host_prompt.as_deref())
        .unwrap();
    assert_eq!(spec.start.as_str(), "^>>> ");
    assert_eq!(spec.comment_lead, "#");

    let lisp = settings.resolve("inferior-lisp");
    let mut session = FoldSession::new(&lisp.mode, lisp.config);
    let err = session
        .setup(&mut registry, lisp.host_prompt.as_deref())
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(!session.is_active());
}
