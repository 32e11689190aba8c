//! Gathers candidate skills from local storage and the synced catalogue.

use crate::keywords::extract_keywords;
use crate::types::{Candidate, CandidateScope};
use skillix_discovery::{list_all_skills, SkillRoot};
use skillix_state::Source;
use skillix_sync::{SearchEngine, SearchOptions, SyncEngine};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// Catalogue access for the collector.
#[cfg_attr(test, automock)]
pub trait Marketplace: Send + Sync {
    /// True when no source has ever been recorded in the manifest.
    fn is_empty(&self) -> skillix_sync::Result<bool>;

    /// Syncs the configured sources.
    fn refresh(&self) -> skillix_sync::Result<()>;

    /// Up to `limit` catalogue skills relevant to `task`.
    fn search(&self, task: &str, limit: usize) -> skillix_sync::Result<Vec<Candidate>>;
}

/// [`Marketplace`] over the sync and search engines.
pub struct CatalogMarket {
    search: Arc<SearchEngine>,
    engine: Arc<SyncEngine>,
    sources: Vec<Source>,
}

impl CatalogMarket {
    pub fn new(search: Arc<SearchEngine>, engine: Arc<SyncEngine>, sources: Vec<Source>) -> Self {
        Self {
            search,
            engine,
            sources,
        }
    }
}

impl Marketplace for CatalogMarket {
    fn is_empty(&self) -> skillix_sync::Result<bool> {
        Ok(self.engine.manifest().load()?.sources.is_empty())
    }

    fn refresh(&self) -> skillix_sync::Result<()> {
        let report = self.engine.sync_all(&self.sources, false);
        for failure in &report.failed {
            tracing::warn!(source = %failure.id, code = %failure.code, error = %failure.message, "catalogue sync failed");
        }
        Ok(())
    }

    /// Searches once per task keyword and ranks skills by summed score, so a
    /// sentence-length task still finds skills matching any of its words.
    fn search(&self, task: &str, limit: usize) -> skillix_sync::Result<Vec<Candidate>> {
        let opts = SearchOptions {
            limit: usize::MAX,
            ..SearchOptions::default()
        };
        let mut order: Vec<(String, String)> = Vec::new();
        let mut scored: HashMap<(String, String), (f64, Candidate)> = HashMap::new();

        for keyword in extract_keywords(task) {
            for hit in self.search.search(&keyword, &opts)?.results {
                let key = (hit.source_id.clone(), hit.skill.name.clone());
                match scored.get_mut(&key) {
                    Some((score, _)) => *score += hit.score,
                    None => {
                        order.push(key.clone());
                        scored.insert(
                            key,
                            (
                                hit.score,
                                Candidate {
                                    name: hit.skill.name,
                                    description: hit.skill.description,
                                    tags: hit.skill.tags,
                                    scope: CandidateScope::Market,
                                    source: hit.source_name,
                                },
                            ),
                        );
                    }
                }
            }
        }

        let mut ranked: Vec<(f64, Candidate)> =
            order.iter().filter_map(|k| scored.remove(k)).collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut names = HashSet::new();
        Ok(ranked
            .into_iter()
            .map(|(_, c)| c)
            .filter(|c| names.insert(c.name.clone()))
            .take(limit)
            .collect())
    }
}

pub struct Collector<'a> {
    roots: Vec<SkillRoot>,
    market: Option<&'a dyn Marketplace>,
    market_limit: usize,
}

impl<'a> Collector<'a> {
    /// `roots` in precedence order (project first).
    pub fn new(roots: Vec<SkillRoot>) -> Self {
        Self {
            roots,
            market: None,
            market_limit: 0,
        }
    }

    pub fn with_market(mut self, market: &'a dyn Marketplace, limit: usize) -> Self {
        self.market = Some(market);
        self.market_limit = limit;
        self
    }

    /// Local skills (project shadows global), then market skills not
    /// already present locally.
    pub fn collect(&self, task: &str) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = list_all_skills(&self.roots)
            .into_iter()
            .map(Candidate::from)
            .collect();

        if let Some(market) = self.market.filter(|_| self.market_limit > 0) {
            match self.market_candidates(market, task) {
                Ok(found) => {
                    let local: HashSet<String> = candidates.iter().map(|c| c.name.clone()).collect();
                    candidates.extend(found.into_iter().filter(|c| !local.contains(&c.name)));
                }
                Err(e) => {
                    tracing::warn!(error = %e, code = e.code(), "market search failed; using local skills only");
                }
            }
        }
        tracing::debug!(count = candidates.len(), "collected candidates");
        candidates
    }

    fn market_candidates(&self, market: &dyn Marketplace, task: &str) -> skillix_sync::Result<Vec<Candidate>> {
        if market.is_empty()? {
            tracing::info!("no catalogue synced yet; syncing configured sources");
            market.refresh()?;
        }
        market.search(task, self.market_limit)
    }
}
