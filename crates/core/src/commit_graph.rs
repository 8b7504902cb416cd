// SPDX-License-Identifier: MIT

//! The derived commit graph: parent→children adjacency, rebuilt per
//! operation that needs it and never persisted. This is where the
//! merge-descendant search (§4.4) and the unmerge forward/ancestor search
//! (§4.5) live.

use crate::commit::CommitId;
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

/// A commit graph built from `commit → parents` edges, as reported by a
/// working copy's log. Child edges are derived on construction.
#[derive(Debug, Clone, Default)]
pub struct CommitGraph {
    parents: IndexMap<CommitId, Vec<CommitId>>,
    children: IndexMap<CommitId, Vec<CommitId>>,
}

impl CommitGraph {
    /// Build a graph from `commit → parent ids` edges. Commits with no
    /// recorded parents are treated as roots.
    pub fn new(parents: IndexMap<CommitId, Vec<CommitId>>) -> Self {
        let mut children: IndexMap<CommitId, Vec<CommitId>> = IndexMap::new();
        for (commit, commit_parents) in &parents {
            children.entry(commit.clone()).or_default();
            for parent in commit_parents {
                children.entry(parent.clone()).or_default().push(commit.clone());
            }
        }
        Self { parents, children }
    }

    pub fn parents_of(&self, id: &CommitId) -> &[CommitId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of(&self, id: &CommitId) -> &[CommitId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_merge_commit(&self, id: &CommitId) -> bool {
        self.parents_of(id).len() > 1
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.parents.contains_key(id) || self.children.contains_key(id)
    }

    /// The legal merge-descendant set of `start`: `start` itself, plus any
    /// commit reachable forward through children that is itself a merge
    /// commit. Non-merge commits reachable forward are not legal targets —
    /// only `start` or an actual merge point can be reused as a landing
    /// branch.
    pub fn merge_descendants(&self, start: &CommitId) -> IndexSet<CommitId> {
        let mut result = IndexSet::new();
        result.insert(start.clone());

        let mut visited: IndexSet<CommitId> = IndexSet::new();
        visited.insert(start.clone());
        let mut queue: VecDeque<CommitId> = self.children_of(start).iter().cloned().collect();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if self.is_merge_commit(&id) {
                result.insert(id.clone());
            }
            for child in self.children_of(&id) {
                if !visited.contains(child) {
                    queue.push_back(child.clone());
                }
            }
        }

        result
    }

    /// Intersection of the legal merge-descendant sets of every commit in
    /// `starts`, in the order they first appear in `starts[0]`'s set (this
    /// keeps the result deterministic across invocations with the same
    /// input).
    ///
    /// Fast-forward equivalence (§8 scenario 4): if one selected commit is
    /// itself a forward ancestor of another, that other commit already
    /// contains the ancestor's entire history, so it's added to the
    /// ancestor's legal set even though it isn't a merge commit. Without
    /// this, two commits related only by a straight-line extension (no
    /// merge commit anywhere between them) would never intersect, forcing
    /// a needless synthetic `--no-ff` merge where a plain reuse of the
    /// descendant's own branch is correct.
    pub fn common_descendant(&self, starts: &[CommitId]) -> Option<CommitId> {
        let mut sets: Vec<IndexSet<CommitId>> =
            starts.iter().map(|c| self.merge_descendants(c)).collect();

        for i in 0..starts.len() {
            for j in 0..starts.len() {
                if i != j && self.is_ancestor(&starts[j], &starts[i]) {
                    sets[i].insert(starts[j].clone());
                }
            }
        }

        let mut iter = sets.into_iter();
        let first = iter.next()?;
        let rest: Vec<IndexSet<CommitId>> = iter.collect();

        first
            .into_iter()
            .find(|candidate| rest.iter().all(|set| set.contains(candidate)))
    }

    /// Breadth-first search forward from `start` (exclusive of `start`
    /// itself) for the first commit satisfying `predicate`, visiting
    /// commits in BFS order so the result is deterministic.
    pub fn bfs_forward_until<F>(&self, start: &CommitId, mut predicate: F) -> Option<CommitId>
    where
        F: FnMut(&CommitId) -> bool,
    {
        let mut visited: IndexSet<CommitId> = IndexSet::new();
        visited.insert(start.clone());
        let mut queue: VecDeque<CommitId> = self.children_of(start).iter().cloned().collect();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if predicate(&id) {
                return Some(id);
            }
            for child in self.children_of(&id) {
                if !visited.contains(child) {
                    queue.push_back(child.clone());
                }
            }
        }

        None
    }

    /// True if `target` is an ancestor of `tip` (including `tip` itself),
    /// walking the first-parent-and-beyond chain backward from `tip`.
    ///
    /// Used as the unmerge algorithm's fallback when a commit is interior
    /// to a still-existing branch rather than its current tip: the forward
    /// BFS from the resolved commit never reaches a branch tip in that
    /// case, so the unmerge planner walks backward from each candidate
    /// branch's tip instead.
    pub fn is_ancestor(&self, tip: &CommitId, target: &CommitId) -> bool {
        if tip == target {
            return true;
        }
        let mut visited: IndexSet<CommitId> = IndexSet::new();
        let mut queue: VecDeque<CommitId> = VecDeque::new();
        queue.push_back(tip.clone());

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if &id == target {
                return true;
            }
            for parent in self.parents_of(&id) {
                if !visited.contains(parent) {
                    queue.push_back(parent.clone());
                }
            }
        }

        false
    }
}

#[cfg(test)]
#[path = "commit_graph_tests.rs"]
mod tests;
