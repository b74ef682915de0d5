use anyhow::Result;
use plugdeck_core::{
    normalize_repositories, BatchReport, Change, ProfileRegistry, RepositoryIdentifier,
    SetOutcome,
};
use plugdeck_store::{acquire, StateStore, TransactionGuard};

use crate::dispatch::{CommandOutcome, OutputLine};

/// Collaborators every profile handler runs against.
pub(crate) struct ProfileContext<'a> {
    pub(crate) store: &'a dyn StateStore,
    pub(crate) guard: &'a dyn TransactionGuard,
    pub(crate) identifier: &'a dyn RepositoryIdentifier,
}

/// Runs `apply` against the stored document and commits it if it changed.
///
/// Failures and no-ops are decided on an unguarded read and never touch the
/// guard. A change re-reads under the guard and re-applies; if it still
/// changes the document, `trx_id` is bumped and written exactly once. The
/// lease releases the guard on every exit path.
fn commit_change<T, F>(ctx: &ProfileContext<'_>, apply: F) -> Result<T>
where
    F: Fn(&mut ProfileRegistry) -> plugdeck_core::Result<Change<T>>,
{
    let mut registry = ProfileRegistry::new(ctx.store.read()?);
    let change = apply(&mut registry)?;
    if !change.is_changed() {
        return Ok(change.into_inner());
    }

    let _lease = acquire(ctx.guard)?;
    let mut registry = ProfileRegistry::new(ctx.store.read()?);
    let change = apply(&mut registry)?;
    if !change.is_changed() {
        tracing::debug!("change already applied by another writer; skipping write");
        return Ok(change.into_inner());
    }
    let value = change.into_inner();

    let mut document = registry.into_document();
    document.trx_id += 1;
    ctx.store.write(&document)?;
    tracing::info!(trx_id = document.trx_id, "committed lock.json transaction");
    Ok(value)
}

fn missing_name(subcommand: &str) -> CommandOutcome {
    CommandOutcome::UsageProblem(format!(
        "'plugdeck profile {subcommand}' receives profile name."
    ))
}

fn missing_repositories(subcommand: &str) -> CommandOutcome {
    CommandOutcome::UsageProblem(format!(
        "'plugdeck profile {subcommand}' receives profile name and one or more repositories."
    ))
}

pub(crate) fn run_get(ctx: &ProfileContext<'_>, _args: &[String]) -> CommandOutcome {
    CommandOutcome::from_result(get_profile(ctx))
}

pub(crate) fn run_set(ctx: &ProfileContext<'_>, args: &[String]) -> CommandOutcome {
    match args.first() {
        Some(name) => CommandOutcome::from_result(set_profile(ctx, name)),
        None => missing_name("set"),
    }
}

pub(crate) fn run_show(ctx: &ProfileContext<'_>, args: &[String]) -> CommandOutcome {
    match args.first() {
        Some(name) => CommandOutcome::from_result(show_profile(ctx, name)),
        None => missing_name("show"),
    }
}

pub(crate) fn run_new(ctx: &ProfileContext<'_>, args: &[String]) -> CommandOutcome {
    match args.first() {
        Some(name) => CommandOutcome::from_result(new_profile(ctx, name)),
        None => missing_name("new"),
    }
}

pub(crate) fn run_destroy(ctx: &ProfileContext<'_>, args: &[String]) -> CommandOutcome {
    match args.first() {
        Some(name) => CommandOutcome::from_result(destroy_profile(ctx, name)),
        None => missing_name("destroy"),
    }
}

pub(crate) fn run_add(ctx: &ProfileContext<'_>, args: &[String]) -> CommandOutcome {
    match args.split_first() {
        Some((name, repos)) if !repos.is_empty() => {
            CommandOutcome::from_result(add_repositories(ctx, name, repos))
        }
        _ => missing_repositories("add"),
    }
}

pub(crate) fn run_rm(ctx: &ProfileContext<'_>, args: &[String]) -> CommandOutcome {
    match args.split_first() {
        Some((name, repos)) if !repos.is_empty() => {
            CommandOutcome::from_result(remove_repositories(ctx, name, repos))
        }
        _ => missing_repositories("rm"),
    }
}

fn get_profile(ctx: &ProfileContext<'_>) -> Result<Vec<OutputLine>> {
    let document = ctx.store.read()?;
    Ok(vec![OutputLine::Plain(document.active_profile)])
}

fn set_profile(ctx: &ProfileContext<'_>, name: &str) -> Result<Vec<OutputLine>> {
    let outcome = commit_change(ctx, |registry| registry.set_active(name))?;
    let line = match outcome {
        SetOutcome::AlreadyActive => format!("Unchanged active profile '{name}'"),
        SetOutcome::Switched { previous } => {
            tracing::debug!(previous = previous.as_str(), "switched active profile");
            format!("Set active profile to '{name}'")
        }
    };
    Ok(vec![OutputLine::Info(line)])
}

fn show_profile(ctx: &ProfileContext<'_>, name: &str) -> Result<Vec<OutputLine>> {
    let registry = ProfileRegistry::new(ctx.store.read()?);
    let view = registry.show(name)?;
    Ok(view.lines().into_iter().map(OutputLine::Plain).collect())
}

fn new_profile(ctx: &ProfileContext<'_>, name: &str) -> Result<Vec<OutputLine>> {
    commit_change(ctx, |registry| registry.create(name))?;
    Ok(vec![OutputLine::Info(format!(
        "Created new profile '{name}'"
    ))])
}

fn destroy_profile(ctx: &ProfileContext<'_>, name: &str) -> Result<Vec<OutputLine>> {
    commit_change(ctx, |registry| registry.destroy(name))?;
    Ok(vec![OutputLine::Info(format!("Deleted profile '{name}'"))])
}

fn add_repositories(
    ctx: &ProfileContext<'_>,
    name: &str,
    raw_repos: &[String],
) -> Result<Vec<OutputLine>> {
    let repos_paths = normalize_repositories(ctx.identifier, raw_repos)?;
    let report = commit_change(ctx, |registry| {
        registry.add_repositories(name, &repos_paths)
    })?;
    Ok(batch_lines(
        &report,
        |repos_path| format!("Added repository '{repos_path}'"),
        |repos_path| format!("repository '{repos_path}' already exists"),
    ))
}

fn remove_repositories(
    ctx: &ProfileContext<'_>,
    name: &str,
    raw_repos: &[String],
) -> Result<Vec<OutputLine>> {
    let repos_paths = normalize_repositories(ctx.identifier, raw_repos)?;
    let report = commit_change(ctx, |registry| {
        registry.remove_repositories(name, &repos_paths)
    })?;
    Ok(batch_lines(
        &report,
        |repos_path| format!("Removed repository '{repos_path}'"),
        |repos_path| format!("repository '{repos_path}' does not exist"),
    ))
}

fn batch_lines(
    report: &BatchReport,
    applied: impl Fn(&str) -> String,
    skipped: impl Fn(&str) -> String,
) -> Vec<OutputLine> {
    report
        .skipped
        .iter()
        .map(|repos_path| OutputLine::Warn(skipped(repos_path)))
        .chain(
            report
                .applied
                .iter()
                .map(|repos_path| OutputLine::Info(applied(repos_path))),
        )
        .collect()
}
