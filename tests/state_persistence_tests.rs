mod support;

use std::fs;

use portal_shell::prefs::{Layout, Theme};
use support::*;

#[tokio::test]
async fn test_session_survives_a_shell_restart() {
    let backend = spawn_backend().await;
    let state_dir = tempfile::tempdir().unwrap();
    let mut config = shell_config(&backend);
    config.state_dir = Some(state_dir.path().to_path_buf());

    // First run: sign in, which persists the token.
    let (shell, _nav) = build_shell_from(config.clone());
    sign_in(&backend, &shell).await;
    assert!(state_dir.path().join("session.json").exists());
    drop(shell);

    // Second run: the token is hydrated, the profile is not (it was never
    // durable and gets re-fetched by the host after restart).
    let (restarted, _nav) = build_shell_from(config.clone());
    assert_eq!(restarted.session.token(), Some(TEST_TOKEN.to_string()));
    assert_eq!(restarted.session.user(), None);

    // Signing out removes the durable token for good.
    restarted.auth().logout().await;
    assert!(!state_dir.path().join("session.json").exists());

    let (third, _nav) = build_shell_from(config);
    assert_eq!(third.session.token(), None);
}

#[tokio::test]
async fn test_stale_sentinel_on_disk_is_cleared_at_startup() {
    let state_dir = tempfile::tempdir().unwrap();
    fs::write(
        state_dir.path().join("session.json"),
        r#"{"token": "undefined"}"#,
    )
    .unwrap();

    let mut config = portal_shell::ShellConfig::default();
    config.state_dir = Some(state_dir.path().to_path_buf());
    let (shell, _nav) = build_shell_from(config);

    assert_eq!(shell.session.token(), None);
    // The garbage document was removed, not just ignored.
    assert!(!state_dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_preferences_survive_a_shell_restart() {
    let state_dir = tempfile::tempdir().unwrap();
    let mut config = portal_shell::ShellConfig::default();
    config.state_dir = Some(state_dir.path().to_path_buf());

    let (shell, _nav) = build_shell_from(config.clone());
    shell.prefs.set_lang("ar");
    shell.prefs.set_theme(Theme::Dark);
    shell.prefs.set_layout(Layout::Tiles);
    shell.prefs.set_branches(vec!["RYD".to_string()]);
    assert!(state_dir.path().join("preferences.json").exists());
    drop(shell);

    let (restarted, _nav) = build_shell_from(config);
    let prefs = restarted.prefs.snapshot();
    assert_eq!(prefs.lang, "ar");
    assert_eq!(prefs.theme, Theme::Dark);
    assert_eq!(prefs.layout, Layout::Tiles);
    assert_eq!(prefs.branches, vec!["RYD".to_string()]);
}

#[tokio::test]
async fn test_malformed_state_files_fall_back_to_defaults() {
    let state_dir = tempfile::tempdir().unwrap();
    fs::write(state_dir.path().join("session.json"), "{not json").unwrap();
    fs::write(state_dir.path().join("preferences.json"), "also not json").unwrap();

    let mut config = portal_shell::ShellConfig::default();
    config.state_dir = Some(state_dir.path().to_path_buf());
    let (shell, _nav) = build_shell_from(config);

    assert_eq!(shell.session.token(), None);
    assert_eq!(shell.prefs.lang(), "en");
    assert_eq!(shell.prefs.theme(), Theme::System);
}
