use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Context, anyhow, bail};
use keel_config::KeelConfig;
use keel_core::{DiffEntry, JsonPath};
use keel_draft::side_channel::parse_text_value;
use keel_draft::{
    AddKey, DraftManager, EnvChannel, FreeFormChannel, SaveRequest, SecretChannel, SettingsAdapter,
};
use serde::Serialize;

use crate::cli::{EditArgs, GlobalFlags, OutputFormat};
use crate::output::{output, render_diff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    NothingToSave,
    DryRun,
    Cancelled,
    Saved,
}

#[derive(Debug, Serialize)]
struct EditReport {
    tool: String,
    outcome: Outcome,
    changes: Vec<DiffEntry>,
}

/// Handle `keel edit <tool>`.
pub async fn handle(
    args: &EditArgs,
    config: &KeelConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut manager = super::load_session(&args.tool, config).await?;
    apply_edits(&mut manager, args)?;

    let diffs = match manager.request_save().context("cannot prepare save")? {
        SaveRequest::NothingToSave => {
            return report(&args.tool, Outcome::NothingToSave, Vec::new(), flags, false);
        }
        SaveRequest::Confirm { diffs } => diffs,
    };

    if args.dry_run {
        manager.cancel_save();
        return report(&args.tool, Outcome::DryRun, diffs, flags, false);
    }

    let prompted = !(args.yes || config.general.assume_yes);
    if prompted && !confirm(&args.tool, &diffs)? {
        manager.cancel_save();
        return report(&args.tool, Outcome::Cancelled, diffs, flags, true);
    }

    let saved = manager
        .confirm_save()
        .await
        .with_context(|| format!("save for '{}' failed; nothing was marked saved", args.tool))?;
    report(&args.tool, Outcome::Saved, saved, flags, prompted)
}

/// Apply every requested edit to the draft, in the order deletes, adds, sets,
/// then side-channel edits.
fn apply_edits<A: SettingsAdapter>(
    manager: &mut DraftManager<A>,
    args: &EditArgs,
) -> anyhow::Result<()> {
    for key in &args.delete {
        if !manager.delete_key(key)? {
            tracing::warn!(key = %key, "key not present; nothing deleted");
        }
    }
    for (key, field_type) in &args.add {
        manager.add_key(
            key,
            AddKey {
                schema: None,
                field_type: *field_type,
            },
        )?;
    }
    for (path, text) in &args.set {
        let path: JsonPath = path.parse()?;
        let value = parse_text_value(text).with_context(|| format!("invalid JSON for '{path}'"))?;
        manager.set_value(&path, value)?;
    }

    if let Some(token) = &args.token {
        manager
            .side_channel_mut::<SecretChannel>()
            .ok_or_else(|| anyhow!("tool '{}' has no [auth] document configured", args.tool))?
            .set(token.trim());
    }
    if !args.env.is_empty() {
        let env = manager
            .side_channel_mut::<EnvChannel>()
            .ok_or_else(|| anyhow!("tool '{}' has no [env] document configured", args.tool))?;
        for (field, value) in &args.env {
            env.set(field, value.as_str())?;
        }
    }
    if !args.extra.is_empty() || !args.remove_extra.is_empty() {
        let extra = manager
            .side_channel_mut::<FreeFormChannel>()
            .ok_or_else(|| anyhow!("tool '{}' has no extra document configured", args.tool))?;
        for key in &args.remove_extra {
            if !extra.remove_entry(key) {
                tracing::warn!(key = %key, "extra entry not present; nothing removed");
            }
        }
        for (key, text) in &args.extra {
            extra.set_entry(key, text.as_str());
        }
    }
    Ok(())
}

/// Show the pending diff on stderr and ask for a yes/no answer.
fn confirm(tool: &str, diffs: &[DiffEntry]) -> anyhow::Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        bail!("confirmation required for {} change(s) to '{tool}'; re-run with --yes", diffs.len());
    }
    let mut stderr = std::io::stderr().lock();
    writeln!(stderr, "{}", render_diff(diffs))?;
    write!(stderr, "Apply {} change(s) to '{tool}'? [y/N] ", diffs.len())?;
    stderr.flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn report(
    tool: &str,
    outcome: Outcome,
    changes: Vec<DiffEntry>,
    flags: &GlobalFlags,
    diff_shown: bool,
) -> anyhow::Result<()> {
    match flags.format {
        OutputFormat::Json => output(
            &EditReport {
                tool: tool.to_string(),
                outcome,
                changes,
            },
            flags.format,
        ),
        OutputFormat::Table => {
            if !diff_shown && !changes.is_empty() {
                println!("{}", render_diff(&changes));
            }
            if !flags.quiet {
                println!("{}", summary(tool, outcome, changes.len()));
            }
            Ok(())
        }
    }
}

fn summary(tool: &str, outcome: Outcome, count: usize) -> String {
    match outcome {
        Outcome::NothingToSave => format!("{tool}: nothing to save"),
        Outcome::DryRun => format!("{tool}: {count} change(s) not saved (dry run)"),
        Outcome::Cancelled => format!("{tool}: cancelled, {count} change(s) discarded"),
        Outcome::Saved => format!("{tool}: saved {count} change(s)"),
    }
}
