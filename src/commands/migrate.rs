use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::clockify::{ClockifyCli, EntryDraft, SinkCatalog, SinkWriter};
use crate::error::{MigrateError, Result};
use crate::mapping::MappingStore;
use crate::model::{Interval, Outcome, Policy};
use crate::report::{Format, RunReport, print_report, trace};
use crate::resolve::{Prompt, StdinPrompt, resolve};
use crate::timew::{DateRange, SourceExport, TimewCli};

pub struct Options {
    pub policy: Policy,
    pub dry_run: bool,
    pub interactive: bool,
}

/// CLI entry: preflight checks, mapping load, source export, then the engine.
#[allow(clippy::too_many_arguments)]
pub fn run(
    config: Option<PathBuf>,
    dry_run: bool,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    policy: Policy,
    non_interactive: bool,
    format: Format,
) -> Result<()> {
    ClockifyCli::check_available()?;
    TimewCli::check_available()?;

    let config = config.unwrap_or_else(MappingStore::default_path);
    let mapping = MappingStore::load(&config)?;
    if mapping.is_empty() {
        return Err(MigrateError::NoMappings(config));
    }

    let intervals = TimewCli.export(DateRange { start, end })?;

    let opts = Options {
        policy,
        dry_run,
        interactive: !non_interactive,
    };
    let sink = ClockifyCli;
    let mut prompt = StdinPrompt { format };
    let report = migrate(&intervals, &mapping, &sink, &sink, &mut prompt, &opts, format);
    print_report(&report, "Migration", "migrated", format)
}

/// The tag-resolution and migration engine. Strictly sequential, source
/// order preserved; nothing raised inside the loop escapes it. The run cache
/// lives exactly as long as this call.
pub fn migrate<W: SinkWriter, C: SinkCatalog, P: Prompt>(
    intervals: &[Interval],
    mapping: &MappingStore,
    sink: &W,
    catalog: &C,
    prompt: &mut P,
    opts: &Options,
    format: Format,
) -> RunReport {
    let mut report = RunReport::new(opts.dry_run);
    if intervals.is_empty() {
        trace(format, "No timewarrior entries found to migrate.");
        return report;
    }

    // One interactive prompt per distinct unmapped tag per run. Only
    // successful resolutions are cached; failures prompt again next time.
    let mut run_cache: HashMap<String, (String, String)> = HashMap::new();

    for interval in intervals {
        let outcome = handle_interval(
            interval,
            mapping,
            &mut run_cache,
            sink,
            catalog,
            prompt,
            opts,
            format,
        );
        report.record(&outcome);
    }
    report
}

#[allow(clippy::too_many_arguments)]
fn handle_interval<W: SinkWriter, C: SinkCatalog, P: Prompt>(
    interval: &Interval,
    mapping: &MappingStore,
    run_cache: &mut HashMap<String, (String, String)>,
    sink: &W,
    catalog: &C,
    prompt: &mut P,
    opts: &Options,
    format: Format,
) -> Outcome {
    let Some(classification) = opts.policy.classify(&interval.tags) else {
        let reason = format!(
            "needs at least {} tag(s) under the {} policy",
            opts.policy.min_tags(),
            opts.policy
        );
        trace(
            format,
            &format!("Skipping entry {}: {reason}", interval.range_label()),
        );
        return Outcome::Skipped(reason);
    };

    let Some(end) = interval.end else {
        trace(
            format,
            &format!(
                "Skipping ongoing entry: {} - {}",
                interval.start.to_rfc3339(),
                classification.classifier
            ),
        );
        return Outcome::Skipped("ongoing entry".into());
    };

    let tag = &classification.classifier;
    let (client, project) = if let Some(target) = mapping.get(tag) {
        (target.client.clone(), target.project.clone())
    } else if let Some(cached) = run_cache.get(tag) {
        cached.clone()
    } else if opts.interactive {
        match resolve(tag, catalog, prompt, mapping, format) {
            Some(pair) => {
                // cached whether or not the operator chose to persist it
                run_cache.insert(tag.clone(), pair.clone());
                pair
            }
            None => {
                let reason = format!("tag {tag:?} left unresolved");
                trace(
                    format,
                    &format!("Skipping entry {}: {reason}", interval.range_label()),
                );
                return Outcome::Skipped(reason);
            }
        }
    } else {
        let reason = format!("unmapped tag {tag:?}");
        trace(
            format,
            &format!("Skipping entry with {reason}: {}", interval.range_label()),
        );
        return Outcome::Skipped(reason);
    };

    // reporting only; never affects control flow
    let hours = interval.hours().unwrap_or_default();
    let draft = EntryDraft {
        client,
        project,
        description: classification.description,
        start: interval.start,
        end,
    };

    if opts.dry_run {
        trace(
            format,
            &format!(
                "Would add: {} ({hours:.2}h) to {}/{}: {}",
                interval.range_label(),
                draft.client,
                draft.project,
                draft.description
            ),
        );
        return Outcome::Migrated;
    }

    trace(
        format,
        &format!(
            "Adding: {} ({hours:.2}h) to {}/{}: {}",
            interval.range_label(),
            draft.client,
            draft.project,
            draft.description
        ),
    );
    match sink.create_entry(&draft) {
        Ok(output) => {
            if output.is_empty() {
                trace(format, "  Success");
            } else {
                trace(format, &format!("  Success: {output}"));
            }
            Outcome::Migrated
        }
        Err(e) => {
            trace(format, &format!("  Error: {e}"));
            Outcome::Failed(e.to_string())
        }
    }
}
