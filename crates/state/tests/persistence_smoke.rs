use skillix_state::{load_config, read_json, write_json_atomic, SkillixPaths, SkillScope};
use skillix_test_utils::{env_guard, set_env_var, TestFixture};
use std::collections::BTreeMap;

#[test]
fn installed_file_round_trip_under_fixture_roots() {
    let fixture = TestFixture::new().unwrap();
    let paths = SkillixPaths::new(&fixture.global_root, Some(fixture.project_root.clone()));

    let target = paths.installed_file(SkillScope::Project).unwrap();
    let mut doc = BTreeMap::new();
    doc.insert("version".to_string(), "1.0".to_string());
    write_json_atomic(&target, &doc).unwrap();

    assert!(target.starts_with(fixture.project_dir()));
    let back: BTreeMap<String, String> = read_json(&target).unwrap().unwrap();
    assert_eq!(back, doc);
}

#[test]
fn from_env_uses_skillix_home_and_project_root() {
    let _g = env_guard();
    let fixture = TestFixture::new().unwrap();
    let _home = fixture.home_guard();
    let _project = set_env_var(
        "SKILLIX_PROJECT_ROOT",
        Some(fixture.project_root.to_str().unwrap()),
    );

    let paths = SkillixPaths::from_env(None).unwrap();
    assert_eq!(paths.global_root, fixture.global_root);
    assert_eq!(paths.project_root.as_deref(), Some(fixture.project_root.as_path()));

    let config = load_config(&paths).unwrap();
    assert_eq!(config.sources.len(), 1);
    assert!(config.sources[0].is_default);
}
