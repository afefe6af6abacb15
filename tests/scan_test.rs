//! End-to-end scans of real repositories
//!
//! Builds git repositories with git2, scans them into an on-disk store,
//! reopens the store and scans again.

use git2::{Oid, Repository};
use std::path::Path;

use gitgraph::git::{LocatedRepository, RepositoryLocator};
use gitgraph::graph::{branch_head_sha, stats, EdgeKind, GraphQuery, GraphStore, NodeKind};
use gitgraph::ingest::scan_repository;
use gitgraph::ErrorKind;

fn commit_file(repo: &Repository, file: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    std::fs::write(workdir.join(file), content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = repo.signature().unwrap();
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Commit a tree holding exactly `files` on `update_ref`
fn commit_tree(
    repo: &Repository,
    update_ref: &str,
    files: &[(&str, &str)],
    parents: &[Oid],
    message: &str,
) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        builder.insert(name, blob, 0o100644).unwrap();
    }
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();
    let sig = repo.signature().unwrap();
    let parents: Vec<git2::Commit<'_>> = parents
        .iter()
        .map(|oid| repo.find_commit(*oid).unwrap())
        .collect();
    let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();
    repo.commit(Some(update_ref), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn init_repo(dir: &Path) -> Repository {
    let repo = Repository::init(dir).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();
    repo
}

fn current_branch(repo: &Repository) -> String {
    repo.head().unwrap().shorthand().unwrap().to_string()
}

fn locate(dir: &Path) -> LocatedRepository {
    RepositoryLocator::new(false)
        .locate(dir)
        .unwrap()
        .into_iter()
        .next()
        .unwrap()
}

#[test]
fn test_scan_save_reopen_rescan() {
    let work = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    let repo = init_repo(work.path());
    commit_file(&repo, "a.txt", "one", "Add a");
    let second = commit_file(&repo, "a.txt", "two", "Update a");
    let located = locate(work.path());

    {
        let store = GraphStore::new(db.path()).unwrap();
        let stats = scan_repository(&store, &located, None).unwrap();
        assert_eq!(stats.commits_created, 2);
        assert_eq!(stats.parent_edges, 1);
        assert_eq!(stats.files_created, 1);
        store.save().unwrap();
    }

    let store = GraphStore::new(db.path()).unwrap();
    let counts_before = stats(&store);
    let rescan = scan_repository(&store, &located, None).unwrap();

    assert_eq!(rescan.nodes_created(), 0);
    assert_eq!(rescan.changes_created, 0);
    assert_eq!(stats(&store), counts_before);
    assert_eq!(counts_before["Repository"], 1);
    assert_eq!(counts_before["Commit"], 2);
    assert_eq!(counts_before["Author"], 1);

    let branch = current_branch(&repo);
    assert_eq!(
        branch_head_sha(&store, &branch),
        Some(second.to_string())
    );

    let file = store.find_node(NodeKind::File, "a.txt").unwrap();
    assert!(store.get_i64(file, "createdAtEpoch").is_some());
    assert!(store.get_i64(file, "lastModificationAtEpoch").is_some());
}

#[test]
fn test_incremental_scan_walks_only_new_commits() {
    let work = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    let repo = init_repo(work.path());
    let first = commit_file(&repo, "a.txt", "one", "first");
    let second = commit_file(&repo, "b.txt", "two", "second");
    let branch = current_branch(&repo);
    let range = format!("{}..{}", first, branch);
    let located = locate(work.path());

    {
        let store = GraphStore::new(db.path()).unwrap();
        let stats = scan_repository(&store, &located, Some(&range)).unwrap();
        assert_eq!(stats.commits_created, 1);
        assert_eq!(stats.gaps, 1);
        store.save().unwrap();
    }

    let third = commit_file(&repo, "c.txt", "three", "third");

    let store = GraphStore::new(db.path()).unwrap();
    let stats = scan_repository(&store, &located, Some(&range)).unwrap();

    assert_eq!(
        stats.effective_range,
        Some(format!("{}..{}", second, branch))
    );
    assert_eq!(stats.commits_walked, 1);
    assert_eq!(stats.commits_created, 1);
    assert_eq!(stats.parent_edges, 1);

    let newest = store.find_node(NodeKind::Commit, &third.to_string()).unwrap();
    let previous = store.find_node(NodeKind::Commit, &second.to_string()).unwrap();
    assert_eq!(store.targets(newest, EdgeKind::HasParent), vec![previous]);
    assert_eq!(branch_head_sha(&store, &branch), Some(third.to_string()));
}

#[test]
fn test_failed_scan_leaves_database_untouched() {
    let work = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    let repo = init_repo(work.path());
    commit_file(&repo, "a.txt", "one", "first");
    let located = locate(work.path());

    let store = GraphStore::new(db.path()).unwrap();
    let err = scan_repository(&store, &located, Some("no-such-rev..")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    drop(store);

    let reopened = GraphStore::new(db.path()).unwrap();
    assert_eq!(reopened.node_count(), 0);
}

#[test]
fn test_tags_and_repository_head() {
    let work = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    let repo = init_repo(work.path());
    let first = commit_file(&repo, "a.txt", "one", "first");
    let target = repo.find_object(first, None).unwrap();
    let sig = repo.signature().unwrap();
    repo.tag("v1.0", &target, &sig, "release", false).unwrap();
    repo.tag_lightweight("light", &target, false).unwrap();
    let head = commit_file(&repo, "a.txt", "two", "second");
    let located = locate(work.path());

    let store = GraphStore::new(db.path()).unwrap();
    let stats = scan_repository(&store, &located, None).unwrap();
    assert_eq!(stats.tags_created, 2);

    let first_node = store.find_node(NodeKind::Commit, &first.to_string()).unwrap();
    for label in ["v1.0", "light"] {
        let tag = store.find_node(NodeKind::Tag, label).unwrap();
        assert_eq!(store.targets(tag, EdgeKind::Tags), vec![first_node]);
    }

    let repository = store.find_all(NodeKind::Repository)[0].1;
    let head_node = store.find_node(NodeKind::Commit, &head.to_string()).unwrap();
    assert_eq!(store.targets(repository, EdgeKind::HasHead), vec![head_node]);
    assert_eq!(
        store.get_str(repository, "name"),
        Some(located.name.clone())
    );
}

#[test]
fn test_merge_commit_has_two_parents_and_one_change_per_path() {
    let work = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    let repo = init_repo(work.path());
    let base = commit_tree(&repo, "HEAD", &[("a.txt", "base\n")], &[], "base");
    let left = commit_tree(&repo, "HEAD", &[("a.txt", "left\n")], &[base], "left");
    let right = commit_tree(
        &repo,
        "refs/heads/right",
        &[("a.txt", "right\n"), ("b.txt", "from the right side\n")],
        &[base],
        "right",
    );
    let merge = commit_tree(
        &repo,
        "HEAD",
        &[("a.txt", "merged\n"), ("b.txt", "from the right side\n")],
        &[left, right],
        "merge",
    );
    let located = locate(work.path());

    let store = GraphStore::new(db.path()).unwrap();
    let stats = scan_repository(&store, &located, None).unwrap();
    assert_eq!(stats.commits_created, 4);
    assert_eq!(stats.parent_edges, 4);

    let merge_node = store.find_node(NodeKind::Commit, &merge.to_string()).unwrap();
    let mut parents = store.targets(merge_node, EdgeKind::HasParent);
    parents.sort();
    let mut expected = vec![
        store.find_node(NodeKind::Commit, &left.to_string()).unwrap(),
        store.find_node(NodeKind::Commit, &right.to_string()).unwrap(),
    ];
    expected.sort();
    assert_eq!(parents, expected);

    let mut paths: Vec<String> = store
        .targets(merge_node, EdgeKind::HasChange)
        .into_iter()
        .filter_map(|change| store.get_str(change, "newPath"))
        .collect();
    paths.sort();
    assert_eq!(paths, vec!["a.txt", "b.txt"]);
}
