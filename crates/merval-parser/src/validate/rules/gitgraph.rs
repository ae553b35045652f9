//! Git graphs are replayed in order: a branch or commit exists from the
//! command that creates it onwards.

use merval_core::ast::{
    Diagram, GitGraphDiagram,
    gitgraph::{COMMIT_TYPES, DEFAULT_BRANCH, GitCommandKind},
};

use crate::{
    error::DiagnosticCollector,
    validate::{DuplicateChecker, EnumValidator, FnRule, ReferenceChecker},
};

pub(in crate::validate) const RULES: [FnRule; 5] = [
    FnRule::new("gitgraph-duplicate-branch", duplicate_branches),
    FnRule::new("gitgraph-duplicate-commit-id", duplicate_commit_ids),
    FnRule::new("gitgraph-branch-reference", branch_references),
    FnRule::new("gitgraph-commit-reference", commit_references),
    FnRule::new("gitgraph-commit-type", commit_types),
];

const COMMIT_TYPE: EnumValidator = EnumValidator::new("commit type", &COMMIT_TYPES);

fn git_graph(diagram: &Diagram) -> Option<&GitGraphDiagram> {
    match diagram {
        Diagram::GitGraph(graph) => Some(graph),
        _ => None,
    }
}

fn duplicate_branches(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(graph) = git_graph(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("branch");
    checker.predefine(DEFAULT_BRANCH, graph.header.position);
    for command in &graph.commands {
        if let GitCommandKind::Branch { name, .. } = &command.kind {
            out.extend(checker.check(name, command.position));
        }
    }
}

fn duplicate_commit_ids(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(graph) = git_graph(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("commit id");
    for command in &graph.commands {
        if let GitCommandKind::Commit { id: Some(id), .. }
        | GitCommandKind::Merge { id: Some(id), .. } = &command.kind
        {
            out.extend(checker.check(id, command.position));
        }
    }
}

fn branch_references(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(graph) = git_graph(diagram) else {
        return;
    };
    let mut branches = ReferenceChecker::new("branch");
    branches.register(DEFAULT_BRANCH, graph.header.position);
    for command in &graph.commands {
        match &command.kind {
            GitCommandKind::Branch { name, .. } => branches.register(name, command.position),
            GitCommandKind::Checkout { branch } => {
                out.extend(branches.check(branch, command.position, "`checkout`"));
            }
            GitCommandKind::Merge { branch, .. } => {
                out.extend(branches.check(branch, command.position, "`merge`"));
            }
            GitCommandKind::Commit { .. } | GitCommandKind::CherryPick { .. } => {}
        }
    }
}

fn commit_references(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(graph) = git_graph(diagram) else {
        return;
    };
    let mut commits = ReferenceChecker::new("commit");
    for command in &graph.commands {
        match &command.kind {
            GitCommandKind::Commit { id: Some(id), .. }
            | GitCommandKind::Merge { id: Some(id), .. } => commits.register(id, command.position),
            GitCommandKind::CherryPick { id, parent } => {
                out.extend(commits.check(id, command.position, "`cherry-pick`"));
                if let Some(parent) = parent {
                    out.extend(commits.check(parent, command.position, "`cherry-pick` parent"));
                }
            }
            _ => {}
        }
    }
}

fn commit_types(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(graph) = git_graph(diagram) else {
        return;
    };
    for command in &graph.commands {
        if let GitCommandKind::Commit {
            commit_type: Some(commit_type),
            ..
        }
        | GitCommandKind::Merge {
            commit_type: Some(commit_type),
            ..
        } = &command.kind
        {
            out.extend(COMMIT_TYPE.check(commit_type, command.position));
        }
    }
}
