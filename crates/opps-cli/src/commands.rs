use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use opps_ingest::{
    Snapshot, read_code_report, replace_snapshot, write_code_report, write_snapshot,
};
use opps_model::ScrubConfig;

use crate::cli::{
    AnnotateArgs, BackfillArgs, Cli, Command, FormatArgs, InputArgs, PassArgs, SchemaArgs,
};
use crate::passes::{
    PassContext, PassOutput, annotate_temp_codes, backfill_codes, fix_dates, format_snapshot,
    known_temp_codes, prepare_import, submitted_total,
};
use crate::summary::{print_report, print_schema, total_line};

/// Load the configuration and apply command line overrides.
pub fn load_config(cli: &Cli) -> Result<ScrubConfig> {
    let mut config = ScrubConfig::load_or_default(cli.config.as_deref()).context("load config")?;
    if let Some(year) = cli.reference_year {
        config.reference_year = year;
    }
    if let Some(schema) = &cli.schema {
        config.schema.clone_from(schema);
    }
    config.validate().context("validate config")?;
    Ok(config)
}

/// Run the selected subcommand to completion.
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    match &cli.command {
        Command::Format(args) => run_format(PassContext::new(config)?, args, cli.json),
        Command::FixDates(args) => run_pass(PassContext::new(config)?, args, cli.json, fix_dates),
        Command::BackfillCodes(args) => run_backfill(PassContext::new(config)?, args, cli.json),
        Command::PrepareImport(args) => {
            run_pass(PassContext::new(config)?, args, cli.json, prepare_import)
        }
        Command::AnnotateTempCodes(args) => run_annotate(PassContext::new(config)?, args, cli.json),
        Command::SubmittedTotal(args) => run_submitted_total(&config, args, cli.json),
        Command::Schema(args) => run_schema(&config, args, cli.json),
    }
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    Snapshot::read(path).with_context(|| format!("read snapshot {}", path.display()))
}

fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize summary")?;
    println!("{text}");
    Ok(())
}

fn emit(output: &PassOutput, json: bool) -> Result<()> {
    if json {
        emit_json(&output.report)
    } else {
        print_report(&output.report);
        Ok(())
    }
}

fn run_format(ctx: PassContext, args: &FormatArgs, json: bool) -> Result<()> {
    let snapshot = read_snapshot(&args.input)?;
    let mut output = format_snapshot(&ctx, &snapshot)?;
    match &args.output {
        Some(path) => {
            write_snapshot(path, &output.records)
                .with_context(|| format!("write {}", path.display()))?;
            output.report.output.clone_from(path);
        }
        None => {
            replace_snapshot(&args.input, &output.records)
                .with_context(|| format!("replace {}", args.input.display()))?;
            output.report.output.clone_from(&args.input);
        }
    }
    info!(output = %output.report.output.display(), "snapshot written");
    emit(&output, json)
}

fn write_output(mut output: PassOutput, path: &Path, json: bool) -> Result<()> {
    write_snapshot(path, &output.records).with_context(|| format!("write {}", path.display()))?;
    output.report.output = path.to_path_buf();
    info!(output = %path.display(), "snapshot written");
    emit(&output, json)
}

fn run_pass<F>(ctx: PassContext, args: &PassArgs, json: bool, pass: F) -> Result<()>
where
    F: FnOnce(&PassContext, &Snapshot) -> Result<PassOutput>,
{
    let snapshot = read_snapshot(&args.input)?;
    let output = pass(&ctx, &snapshot)?;
    write_output(output, &args.output, json)
}

fn run_backfill(ctx: PassContext, args: &BackfillArgs, json: bool) -> Result<()> {
    let snapshot = read_snapshot(&args.pass.input)?;
    let backfill = backfill_codes(&ctx, &snapshot)?;
    if let Some(path) = &args.report {
        write_code_report(path, &backfill.entries)
            .with_context(|| format!("write code report {}", path.display()))?;
        info!(report = %path.display(), codes = backfill.entries.len(), "code report written");
    }
    write_output(backfill.output, &args.pass.output, json)
}

fn run_annotate(ctx: PassContext, args: &AnnotateArgs, json: bool) -> Result<()> {
    let mut reports = Vec::new();
    for path in &args.codes {
        let entries = read_code_report(path)
            .with_context(|| format!("read code report {}", path.display()))?;
        reports.extend(entries);
    }
    let known = known_temp_codes(&ctx.config.project_codes, &reports);
    if known.is_empty() {
        warn!("no temporary codes configured; nothing will be annotated");
    }
    let snapshot = read_snapshot(&args.pass.input)?;
    let output = annotate_temp_codes(&ctx, &snapshot, &known)?;
    write_output(output, &args.pass.output, json)
}

fn run_submitted_total(config: &ScrubConfig, args: &InputArgs, json: bool) -> Result<()> {
    let snapshot = read_snapshot(&args.input)?;
    let total = submitted_total(&config.submitted, &snapshot)?;
    if json {
        emit_json(&total)
    } else {
        println!("{}", total_line(&total));
        Ok(())
    }
}

fn run_schema(config: &ScrubConfig, args: &SchemaArgs, json: bool) -> Result<()> {
    let schema = match &args.version {
        Some(version) => config.schema_named(version)?,
        None => config.resolve_schema()?,
    };
    if json {
        emit_json(&schema)
    } else {
        print_schema(&schema);
        Ok(())
    }
}
