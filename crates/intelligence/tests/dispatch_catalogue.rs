use skillix_discovery::default_roots;
use skillix_intelligence::{
    AnalyzeRequest, CandidateScope, CatalogMarket, Collector, DispatchAction, DispatchAnalyzer,
    DomainLexicon,
};
use skillix_state::{Config, DispatchSettings, SkillixPaths, Source, SyncSettings};
use skillix_sync::testing::FakeGit;
use skillix_sync::{ManifestStore, SearchEngine, SyncEngine, SyncStatus};
use skillix_test_utils::TestFixture;
use std::sync::Arc;

struct World {
    fixture: TestFixture,
    git: Arc<FakeGit>,
    manifest: Arc<ManifestStore>,
    market: CatalogMarket,
}

impl World {
    fn new() -> Self {
        let fixture = TestFixture::new().unwrap();
        let paths = SkillixPaths::new(&fixture.global_root, Some(fixture.project_root.clone()));
        let git = Arc::new(FakeGit::new());
        let manifest = Arc::new(ManifestStore::new(paths.manifest_file()));

        let remote = fixture
            .create_remote(
                "skills",
                &[
                    ("pdf-converter", "Convert PDF documents to images"),
                    ("csv-tools", "Clean up CSV spreadsheets"),
                ],
            )
            .unwrap();
        git.add_remote("https://github.com/org/skills", remote, "c1");

        let sources = vec![Source::new("org", "https://github.com/org/skills").as_default()];
        let engine = Arc::new(SyncEngine::new(
            &paths,
            git.clone(),
            Arc::clone(&manifest),
            SyncSettings::default(),
        ));
        let config = Config {
            sources: sources.clone(),
            ..Config::default()
        };
        let search = Arc::new(SearchEngine::new(&paths, Arc::clone(&manifest), &config));
        let market = CatalogMarket::new(search, engine, sources);

        Self {
            fixture,
            git,
            manifest,
            market,
        }
    }

    fn roots(&self) -> Vec<skillix_discovery::SkillRoot> {
        default_roots(&self.fixture.global_root, Some(&self.fixture.project_dir()))
    }
}

fn analyzer() -> DispatchAnalyzer {
    DispatchAnalyzer::new(DomainLexicon::builtin().unwrap(), DispatchSettings::default())
}

#[test]
fn first_analysis_syncs_and_recommends_install() {
    let world = World::new();
    let collector = Collector::new(world.roots()).with_market(&world.market, 5);

    let result = analyzer().analyze(&collector, &AnalyzeRequest::new("convert PDF to image"));

    assert_eq!(result.action, DispatchAction::Install);
    assert_eq!(result.skill.as_deref(), Some("pdf-converter"));
    assert_eq!(result.scope, Some(CandidateScope::Market));
    assert_eq!(result.source.as_deref(), Some("org"));
    assert!(result.confidence <= 0.9);

    let manifest = world.manifest.load().unwrap();
    assert_eq!(manifest.sources.len(), 1);
    assert_eq!(manifest.sources[0].status, SyncStatus::Synced);
}

#[test]
fn later_analyses_do_not_touch_git() {
    let world = World::new();
    let collector = Collector::new(world.roots()).with_market(&world.market, 5);
    let analyzer = analyzer();

    analyzer.analyze(&collector, &AnalyzeRequest::new("convert PDF to image"));
    let calls_after_first = world.git.calls().len();
    analyzer.analyze(&collector, &AnalyzeRequest::new("clean csv data"));

    assert_eq!(world.git.calls().len(), calls_after_first);
}

#[test]
fn installed_skill_wins_over_catalogue_copy() {
    let world = World::new();
    world
        .fixture
        .create_skill(
            "global",
            "pdf-converter",
            "Convert PDF documents to images",
            &["pdf"],
        )
        .unwrap();
    let collector = Collector::new(world.roots()).with_market(&world.market, 5);

    let result = analyzer().analyze(&collector, &AnalyzeRequest::new("convert PDF to image"));

    assert_eq!(result.action, DispatchAction::UseExisting);
    assert_eq!(result.scope, Some(CandidateScope::Global));
    assert!(result
        .match_details
        .iter()
        .all(|d| d.scope != CandidateScope::Market || d.name != "pdf-converter"));
}

#[test]
fn without_market_nothing_is_synced() {
    let world = World::new();
    let collector = Collector::new(world.roots());

    let result = analyzer().analyze(&collector, &AnalyzeRequest::new("convert PDF to image"));

    assert_eq!(result.action, DispatchAction::CreateNew);
    assert_eq!(result.confidence, 0.7);
    assert!(world.git.calls().is_empty());
}
