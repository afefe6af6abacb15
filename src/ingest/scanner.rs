//! Scan pipeline
//!
//! One scan is a single linear pass over one repository:
//! resolve range -> ingest commits -> resolve branches and tags ->
//! link repository collections -> set repository HEAD.
//!
//! Nothing is committed here. The caller owns the transaction and persists
//! the store only after [`scan`] returned `Ok`.

use tracing::{debug, info};

use super::changes::FileLifecycleTracker;
use super::commits::CommitGraphIngester;
use super::identity::{CacheMode, IdentityCache};
use super::range::RangeResolver;
use super::refs::RefResolver;
use crate::error::ScanResult;
use crate::git::{GitRepository, HistorySource, LocatedRepository};
use crate::graph::{EdgeKind, GraphQuery, NodeId, NodeKind};

/// The identity caches owned by one scan, one per entity kind
pub struct ScanCaches<'s> {
    pub commits: IdentityCache<'s>,
    pub authors: IdentityCache<'s>,
    pub committers: IdentityCache<'s>,
    pub branches: IdentityCache<'s>,
    pub tags: IdentityCache<'s>,
    pub files: FileLifecycleTracker<'s>,
}

impl<'s> ScanCaches<'s> {
    pub fn new(store: &'s dyn GraphQuery, mode: CacheMode) -> Self {
        Self {
            commits: IdentityCache::new(store, NodeKind::Commit, mode),
            authors: IdentityCache::new(store, NodeKind::Author, mode),
            committers: IdentityCache::new(store, NodeKind::Committer, mode),
            branches: IdentityCache::new(store, NodeKind::Branch, mode),
            tags: IdentityCache::new(store, NodeKind::Tag, mode),
            files: FileLifecycleTracker::new(store, mode),
        }
    }
}

/// Statistics from one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Range actually walked, after incremental rewriting
    pub effective_range: Option<String>,
    /// Commits returned by the history walk
    pub commits_walked: usize,
    pub commits_created: usize,
    pub authors_created: usize,
    pub committers_created: usize,
    pub files_created: usize,
    pub branches_created: usize,
    pub tags_created: usize,
    /// Change nodes recorded
    pub changes_created: usize,
    /// HAS_PARENT edges added
    pub parent_edges: usize,
    /// Parents, branch heads or tag targets that could not be found
    pub gaps: usize,
}

impl ScanStats {
    /// Total number of keyed nodes created
    pub fn nodes_created(&self) -> usize {
        self.commits_created
            + self.authors_created
            + self.committers_created
            + self.files_created
            + self.branches_created
            + self.tags_created
    }
}

/// Runs the pipeline for one repository node.
pub struct RepositoryScanner<'s> {
    store: &'s dyn GraphQuery,
    source: &'s dyn HistorySource,
    repository: NodeId,
    caches: ScanCaches<'s>,
    stats: ScanStats,
}

impl<'s> RepositoryScanner<'s> {
    pub fn new(
        store: &'s dyn GraphQuery,
        source: &'s dyn HistorySource,
        repository: NodeId,
        mode: CacheMode,
    ) -> Self {
        Self {
            store,
            source,
            repository,
            caches: ScanCaches::new(store, mode),
            stats: ScanStats::default(),
        }
    }

    pub fn run(mut self, range: Option<&str>) -> ScanResult<ScanStats> {
        // Range errors surface here, before anything is written
        let effective = RangeResolver::new(self.store, self.source, &self.caches.branches)
            .resolve(range)?;
        self.stats.effective_range = effective.as_ref().map(|r| r.to_string());

        let commits = self.source.list_commits(effective.as_ref())?;
        self.stats.commits_walked = commits.len();
        debug!("History walk returned {} commits", commits.len());

        CommitGraphIngester::new(
            self.store,
            self.repository,
            &mut self.caches,
            &mut self.stats,
        )
        .ingest(&commits);

        let branches = self.source.list_branches()?;
        let tags = self.source.list_tags()?;
        let head = self.source.current_head()?;

        {
            let mut refs = RefResolver::new(
                self.store,
                self.repository,
                &mut self.caches,
                &mut self.stats,
            );
            refs.resolve_branches(&branches);
            refs.resolve_tags(&tags);
        }

        self.link_collections();

        RefResolver::new(
            self.store,
            self.repository,
            &mut self.caches,
            &mut self.stats,
        )
        .resolve_head(head.as_ref());

        self.collect_counts();

        info!(
            "Scan complete: {} commits walked, {} commits / {} authors / {} files created, {} parent edges, {} gaps",
            self.stats.commits_walked,
            self.stats.commits_created,
            self.stats.authors_created,
            self.stats.files_created,
            self.stats.parent_edges,
            self.stats.gaps
        );

        Ok(self.stats)
    }

    /// Link authors, committers and files used by this scan to the repository
    fn link_collections(&self) {
        let collections = [
            (self.caches.authors.touched(), EdgeKind::ContainsAuthor),
            (self.caches.committers.touched(), EdgeKind::ContainsCommitter),
            (self.caches.files.files().touched(), EdgeKind::ContainsFile),
        ];
        for (nodes, relation) in collections {
            for node in nodes {
                self.store.relate(self.repository, node, relation);
            }
        }
    }

    fn collect_counts(&mut self) {
        self.stats.commits_created = self.caches.commits.created();
        self.stats.authors_created = self.caches.authors.created();
        self.stats.committers_created = self.caches.committers.created();
        self.stats.files_created = self.caches.files.files().created();
        self.stats.branches_created = self.caches.branches.created();
        self.stats.tags_created = self.caches.tags.created();
    }
}

/// Scan `source` into `store` on behalf of the `repository` node.
///
/// `is_fresh_scan` must only be true when nothing of this repository has been
/// persisted yet; it skips pre-loading the identity caches.
pub fn scan(
    store: &dyn GraphQuery,
    source: &dyn HistorySource,
    repository: NodeId,
    range: Option<&str>,
    is_fresh_scan: bool,
) -> ScanResult<ScanStats> {
    RepositoryScanner::new(store, source, repository, CacheMode::from_fresh(is_fresh_scan))
        .run(range)
}

/// Open a located repository, find or create its node and scan it.
///
/// The scan is fresh exactly when the repository node did not exist yet.
pub fn scan_repository(
    store: &dyn GraphQuery,
    located: &LocatedRepository,
    range: Option<&str>,
) -> ScanResult<ScanStats> {
    let repository = GitRepository::open(&located.git_dir)?;

    let key = located.git_dir.to_string_lossy();
    let mut repositories = IdentityCache::new(store, NodeKind::Repository, CacheMode::Resuming);
    let node = repositories.find_or_create(&key);
    store.set_property(node.id, "name", located.name.clone().into());

    if node.created {
        info!("Scanning new repository '{}'", located.name);
    } else {
        info!("Resuming scan of repository '{}'", located.name);
    }

    scan(store, &repository, node.id, range, node.created)
}
