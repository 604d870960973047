use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ncm_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ncm"))
}

const DATASET: &str = r#"[
  {"id": 1, "codigo": "01", "descricao": "Animais vivos", "data_inicio": "2022-04-01", "data_fim": "9999-12-31", "tipo_ato_inicio": "Res Camex", "numero_ato_inicio": "272", "ano_ato_inicio": "2021"},
  {"id": 2, "codigo": "01.01", "descricao": "Cavalos, asininos e muares, vivos", "data_inicio": "2022-04-01", "data_fim": "9999-12-31", "tipo_ato_inicio": "Res Camex", "numero_ato_inicio": "272", "ano_ato_inicio": "2021"},
  {"id": 3, "codigo": "0101.21.00", "descricao": "-- Reprodutores de ra&#231;a pura", "data_inicio": "2022-04-01", "data_fim": "9999-12-31", "tipo_ato_inicio": "Res Camex", "numero_ato_inicio": "272", "ano_ato_inicio": "2021"},
  {"id": 4, "codigo": "84", "descricao": "Reatores nucleares, caldeiras, m&aacute;quinas", "data_inicio": "2022-04-01", "data_fim": "9999-12-31", "tipo_ato_inicio": "Res Camex", "numero_ato_inicio": "272", "ano_ato_inicio": "2021"}
]"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(root.join("ncm.json"), DATASET).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/ncm.sqlite"
"#,
        root.display()
    );

    let config_path = config_dir.join("ncm.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ncm(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ncm_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("NCM_BACKEND_URL")
        .env_remove("NCM_BACKEND_ANON_KEY")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ncm binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn dataset_path(config_path: &Path) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("ncm.json")
        .display()
        .to_string()
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_ncm(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));

    let (_, _, success) = run_ncm(&config_path, &["init"]);
    assert!(success, "Second init failed (not idempotent)");
}

#[test]
fn test_hydrate_from_file_then_describe() {
    let (_tmp, config_path) = setup_test_env();
    let dataset = dataset_path(&config_path);

    let (stdout, stderr, success) = run_ncm(&config_path, &["hydrate", "--file", &dataset]);
    assert!(success, "hydrate failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("rows:       4"), "got: {}", stdout);
    assert!(stdout.contains("chapters:   2"), "got: {}", stdout);
    assert!(stdout.contains("positions:  1"), "got: {}", stdout);

    let (stdout, _, success) = run_ncm(&config_path, &["describe", "01", "0101.21.00", "84", "73"]);
    assert!(success);
    assert!(stdout.contains("01\tAnimais vivos"));
    assert!(stdout.contains("0101.21.00\tCavalos, asininos e muares, vivos"));
    // Named entities other than the five XML ones stay encoded.
    assert!(stdout.contains("84\tReatores nucleares, caldeiras, m&aacute;quinas"));
    assert!(stdout.contains("73\tGrupo 73"));
}

#[test]
fn test_describe_without_snapshot_uses_fallbacks() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_ncm(&config_path, &["describe", "8471"]);
    assert!(success);
    assert!(stdout.contains("8471\tPosição 84.71"), "got: {}", stdout);
}

#[test]
fn test_info_and_clear() {
    let (_tmp, config_path) = setup_test_env();
    let dataset = dataset_path(&config_path);

    let (stdout, _, success) = run_ncm(&config_path, &["info"]);
    assert!(success);
    assert!(stdout.contains("Snapshot:    none"));

    run_ncm(&config_path, &["hydrate", "--file", &dataset]);
    let (stdout, _, success) = run_ncm(&config_path, &["info"]);
    assert!(success);
    assert!(stdout.contains("Status:      valid"), "got: {}", stdout);

    let (stdout, _, success) = run_ncm(&config_path, &["clear"]);
    assert!(success);
    assert!(stdout.contains("cleared"));

    let (stdout, _, _) = run_ncm(&config_path, &["info"]);
    assert!(stdout.contains("Snapshot:    none"));
}

#[test]
fn test_hydrate_add_keeps_existing_descriptions() {
    let (tmp, config_path) = setup_test_env();
    let dataset = dataset_path(&config_path);
    run_ncm(&config_path, &["hydrate", "--file", &dataset]);

    let extra = tmp.path().join("extra.json");
    fs::write(
        &extra,
        r#"[{"codigo": "01", "descricao": "Replaced"}, {"codigo": "02", "descricao": "Carnes"}]"#,
    )
    .unwrap();

    let (stdout, stderr, success) =
        run_ncm(&config_path, &["hydrate", "--add", "--file", extra.to_str().unwrap()]);
    assert!(success, "hydrate --add failed: {}", stderr);
    assert!(stdout.contains("chapters:   3"), "got: {}", stdout);

    let (stdout, _, _) = run_ncm(&config_path, &["describe", "01", "02"]);
    assert!(stdout.contains("01\tAnimais vivos"));
    assert!(stdout.contains("02\tCarnes"));
}

#[test]
fn test_hydrate_rebuild_replaces_snapshot() {
    let (tmp, config_path) = setup_test_env();
    let dataset = dataset_path(&config_path);
    run_ncm(&config_path, &["hydrate", "--file", &dataset]);

    let other = tmp.path().join("other.json");
    fs::write(&other, r#"[{"codigo": "01", "descricao": "Replaced"}]"#).unwrap();

    // Without --rebuild the fresh snapshot wins.
    run_ncm(&config_path, &["hydrate", "--file", other.to_str().unwrap()]);
    let (stdout, _, _) = run_ncm(&config_path, &["describe", "01"]);
    assert!(stdout.contains("01\tAnimais vivos"));

    run_ncm(&config_path, &["hydrate", "--rebuild", "--file", other.to_str().unwrap()]);
    let (stdout, _, _) = run_ncm(&config_path, &["describe", "01", "84"]);
    assert!(stdout.contains("01\tReplaced"));
    assert!(stdout.contains("84\tGrupo 84"));
}

#[test]
fn test_hydrate_from_backend_requires_config() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_ncm(&config_path, &["hydrate"]);
    assert!(!success);
    assert!(stderr.contains("[backend]"), "got: {}", stderr);
}

#[test]
fn test_empty_backend_key_fails_at_startup() {
    let (tmp, config_path) = setup_test_env();
    fs::write(
        &config_path,
        format!(
            "[db]\npath = \"{}/ncm.sqlite\"\n\n[backend]\nurl = \"https://example.supabase.co\"\nanon_key = \"\"\n",
            tmp.path().display()
        ),
    )
    .unwrap();

    let (_, stderr, success) = run_ncm(&config_path, &["info"]);
    assert!(!success);
    assert!(stderr.contains("backend.anon_key"), "got: {}", stderr);
}

#[test]
fn test_text_commands_need_no_config() {
    let missing = Path::new("/nonexistent/ncm.toml");

    let (stdout, _, success) = run_ncm(missing, &["format", "1234567"]);
    assert!(success);
    assert_eq!(stdout.trim(), "1234.56.7");

    let (stdout, _, _) = run_ncm(missing, &["format", "--pattern", "2-2-2-2", "01012100"]);
    assert_eq!(stdout.trim(), "01.01.21.00");

    let (stdout, _, _) = run_ncm(missing, &["terms", "1234"]);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["1234", "12.34"]);

    let (stdout, _, _) = run_ncm(missing, &["date", "2024-03-05", "not-a-date"]);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["05/03/2024", "not-a-date"]);

    let (stdout, _, _) = run_ncm(missing, &["normalize", "Ração"]);
    assert_eq!(stdout.trim(), "racao");

    let (stdout, _, _) = run_ncm(missing, &["decode", "A &amp; B &#65;"]);
    assert_eq!(stdout.trim(), "A & B A");
}

#[test]
fn test_unknown_pattern_rejected() {
    let missing = Path::new("/nonexistent/ncm.toml");
    let (_, stderr, success) = run_ncm(missing, &["format", "--pattern", "3-3", "123456"]);
    assert!(!success);
    assert!(stderr.contains("3-3"));
}
