use skillix_state::{SkillixPaths, Source, SyncSettings};
use skillix_sync::testing::FakeGit;
use skillix_sync::{ManifestStore, SyncEngine, SyncStatus};
use skillix_test_utils::{write_catalogue_skill, TestFixture};
use std::sync::Arc;

struct Harness {
    fixture: TestFixture,
    paths: SkillixPaths,
    git: Arc<FakeGit>,
    manifest: Arc<ManifestStore>,
}

impl Harness {
    fn new() -> Self {
        let fixture = TestFixture::new().unwrap();
        let paths = SkillixPaths::new(&fixture.global_root, None);
        let manifest = Arc::new(ManifestStore::new(paths.manifest_file()));
        Self {
            fixture,
            paths,
            git: Arc::new(FakeGit::new()),
            manifest,
        }
    }

    fn engine(&self, settings: SyncSettings) -> SyncEngine {
        SyncEngine::new(
            &self.paths,
            self.git.clone(),
            Arc::clone(&self.manifest),
            settings,
        )
    }

    fn remote(&self, repo: &str, skills: &[(&str, &str)], commit: &str) -> Source {
        let dir = self.fixture.create_remote(repo, skills).unwrap();
        let url = format!("https://github.com/org/{repo}");
        self.git.add_remote(&url, dir, commit);
        Source::new(repo, url)
    }
}

#[test]
fn first_sync_clones_indexes_and_records() {
    let h = Harness::new();
    let source = h.remote("catalogue", &[("pdf", "Work with PDF"), ("csv", "CSV tools")], "c1");
    let engine = h.engine(SyncSettings::default());

    let synced = engine.sync_one(&source).unwrap();
    assert!(synced.cloned);
    assert!(synced.has_updates);
    assert_eq!(synced.skill_count, 2);
    assert_eq!(synced.commit, "c1");
    assert_eq!(h.git.calls()[..2], ["clone".to_string(), "sparse-checkout".to_string()]);

    let index_file = h.paths.source_index_file("github.com_org_catalogue");
    assert!(index_file.is_file());

    let entry = h.manifest.entry("github.com/org/catalogue").unwrap().unwrap();
    assert_eq!(entry.status, SyncStatus::Synced);
    assert_eq!(entry.skill_count, Some(2));
    assert_eq!(entry.commit.as_deref(), Some("c1"));
    assert_eq!(entry.index_file, "sources/github.com_org_catalogue.json");
    assert!(entry.synced_at.is_some());
}

#[test]
fn resync_without_remote_change_skips_fast_forward() {
    let h = Harness::new();
    let source = h.remote("catalogue", &[("pdf", "Work with PDF")], "c1");
    let engine = h.engine(SyncSettings::default());
    engine.sync_one(&source).unwrap();

    let again = engine.sync_one(&source).unwrap();
    assert!(!again.has_updates);
    assert!(!again.cloned);
    assert_eq!(again.skill_count, 1);
    assert!(!h.git.calls().contains(&"merge".to_string()));
}

#[test]
fn remote_update_is_fast_forwarded_and_reindexed() {
    let h = Harness::new();
    let source = h.remote("catalogue", &[("pdf", "Work with PDF")], "c1");
    let engine = h.engine(SyncSettings::default());
    engine.sync_one(&source).unwrap();

    write_catalogue_skill(
        &h.fixture.remotes.join("catalogue"),
        "ocr",
        "---\nname: ocr\ndescription: Read text from images\n---\n",
    )
    .unwrap();
    h.git.set_commit(&source.url, "c2");

    let synced = engine.sync_one(&source).unwrap();
    assert!(synced.has_updates);
    assert_eq!(synced.commit, "c2");
    assert_eq!(synced.skill_count, 2);
    assert!(h.git.calls().contains(&"merge".to_string()));
}

#[test]
fn missing_index_is_rebuilt_even_without_updates() {
    let h = Harness::new();
    let source = h.remote("catalogue", &[("pdf", "Work with PDF")], "c1");
    let engine = h.engine(SyncSettings::default());
    engine.sync_one(&source).unwrap();

    let index_file = h.paths.source_index_file("github.com_org_catalogue");
    std::fs::remove_file(&index_file).unwrap();
    let synced = engine.sync_one(&source).unwrap();
    assert!(!synced.has_updates);
    assert!(index_file.is_file());
    assert_eq!(synced.skill_count, 1);
}

#[test]
fn failure_is_recorded_as_error_entry() {
    let h = Harness::new();
    let engine = h.engine(SyncSettings::default());
    let unknown = Source::new("ghost", "https://github.com/org/ghost");

    let err = engine.sync_one(&unknown).unwrap_err();
    assert_eq!(err.code(), "GIT_ERROR");

    let entry = h.manifest.entry("github.com/org/ghost").unwrap().unwrap();
    assert_eq!(entry.status, SyncStatus::Error);
    assert!(!entry.error.unwrap_or_default().is_empty());
    assert!(engine.needs_sync("github.com/org/ghost").unwrap());
}

#[test]
fn diverged_remote_keeps_last_good_commit() {
    let h = Harness::new();
    let source = h.remote("catalogue", &[("pdf", "Work with PDF")], "c1");
    let engine = h.engine(SyncSettings::default());
    engine.sync_one(&source).unwrap();

    h.git.set_commit(&source.url, "rewritten");
    h.git.diverge(&source.url);
    let err = engine.sync_one(&source).unwrap_err();
    assert_eq!(err.code(), "GIT_ERROR");

    let entry = h.manifest.entry("github.com/org/catalogue").unwrap().unwrap();
    assert_eq!(entry.status, SyncStatus::Error);
    assert_eq!(entry.commit.as_deref(), Some("c1"));
}

#[test]
fn repository_without_skills_dir_syncs_empty() {
    let h = Harness::new();
    let dir = h.fixture.remotes.join("bare");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("README.md"), "nothing here").unwrap();
    h.git.add_remote("https://github.com/org/bare", &dir, "c1");
    let engine = h.engine(SyncSettings::default());

    let synced = engine
        .sync_one(&Source::new("bare", "https://github.com/org/bare"))
        .unwrap();
    assert_eq!(synced.skill_count, 0);
    let entry = h.manifest.entry("github.com/org/bare").unwrap().unwrap();
    assert_eq!(entry.status, SyncStatus::Synced);
    assert_eq!(entry.skill_count, Some(0));
}

#[test]
fn sync_all_partitions_and_respects_ttl() {
    let h = Harness::new();
    let good = h.remote("good", &[("pdf", "Work with PDF")], "c1");
    let bad = Source::new("bad", "https://github.com/org/missing");
    let invalid = Source::new("invalid", "not a url");
    let engine = h.engine(SyncSettings::default());

    let report = engine.sync_all(&[good.clone(), bad.clone(), invalid.clone()], false);
    assert_eq!(report.synced.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert!(report.skipped.is_empty());
    let codes: Vec<_> = report.failed.iter().map(|f| f.code.as_str()).collect();
    assert_eq!(codes, vec!["GIT_ERROR", "INVALID_URL"]);
    assert_eq!(report.failed[1].id, "invalid");

    let report = engine.sync_all(&[good.clone(), bad.clone()], false);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "good");
    assert_eq!(report.failed.len(), 1);

    let report = engine.sync_all(&[good], true);
    assert_eq!(report.synced.len(), 1);
    assert!(report.skipped.is_empty());
}

#[test]
fn zero_ttl_always_resyncs() {
    let h = Harness::new();
    let source = h.remote("catalogue", &[("pdf", "Work with PDF")], "c1");
    let engine = h.engine(SyncSettings {
        ttl_seconds: 0,
        ..SyncSettings::default()
    });
    engine.sync_one(&source).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(engine.needs_sync("github.com/org/catalogue").unwrap());
}

#[test]
fn parallel_sync_records_every_source() {
    let h = Harness::new();
    let sources: Vec<Source> = (0..4)
        .map(|i| h.remote(&format!("repo{i}"), &[("pdf", "Work with PDF")], "c1"))
        .collect();
    let engine = h.engine(SyncSettings {
        parallel: true,
        ..SyncSettings::default()
    });

    let report = engine.sync_all(&sources, true);
    assert_eq!(report.synced.len(), 4);
    let names: Vec<_> = report.synced.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["repo0", "repo1", "repo2", "repo3"]);
    assert_eq!(h.manifest.load().unwrap().sources.len(), 4);
}
