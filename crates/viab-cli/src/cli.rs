//! Command-line surface of the `viab` binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{info, warn};
use viab_calculator::FeasibilityCalculator;
use viab_core::{FeasibilityEngine, FloorEdit, ProjectRecord, format_percent};
use viab_types::reference::{FLOOR_KINDS, MONTHLY_SITE_COSTS};
use viab_types::{BoundsTable, FieldValue, ShareSetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Which percentage set an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShareSetArg {
    /// Construction stages (share of the direct cost)
    Direct,
    /// Percentage-based indirect costs (share of the VGV)
    Indirect,
}

impl From<ShareSetArg> for ShareSetKind {
    fn from(arg: ShareSetArg) -> Self {
        match arg {
            ShareSetArg::Direct => ShareSetKind::DirectCostStages,
            ShareSetArg::Indirect => ShareSetKind::IndirectCostItems,
        }
    }
}

/// Real-estate feasibility calculator
#[derive(Debug, Parser)]
#[command(name = "viab")]
#[command(about = "Areas, costs and margins of a real-estate development")]
#[command(version)]
pub struct ViabCli {
    #[command(subcommand)]
    pub command: ViabCommand,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "json", global = true)]
    pub log_format: LogFormat,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum ViabCommand {
    /// Evaluate a project document and print its report
    Report {
        /// Project document (JSON)
        project: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Write a fresh project document with the configured defaults
    New {
        /// Project name
        name: String,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set one share and redistribute the rest of its set
    EditShare {
        /// Project document (JSON)
        project: PathBuf,

        /// Share set to edit
        #[arg(short, long, value_enum)]
        set: ShareSetArg,

        /// Share key, as listed by `viab tables`
        #[arg(short, long)]
        key: String,

        /// New percentage (0-100, "3,5" and "3.5" both accepted)
        #[arg(short = 'p', long)]
        percentage: String,

        /// Output file, the input document is rewritten when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Change fields of one floor
    EditFloor {
        /// Project document (JSON)
        project: PathBuf,

        /// Zero-based floor index
        #[arg(short, long)]
        index: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        kind: Option<String>,

        #[arg(long)]
        repeat_count: Option<String>,

        #[arg(long)]
        area: Option<String>,

        #[arg(long)]
        coefficient: Option<String>,

        #[arg(long)]
        counts_as_built: Option<bool>,

        /// Output file, the input document is rewritten when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate a named formula with `key=value` arguments
    Calc {
        /// Formula name, as listed by `viab calc --list`
        #[arg(required_unless_present = "list")]
        name: Option<String>,

        #[arg(value_parser = parse_argument)]
        args: Vec<(String, FieldValue)>,

        /// List the available formulas
        #[arg(long)]
        list: bool,
    },

    /// Print the reference tables
    Tables,
}

/// Parses one `key=value` formula argument. Values that read as JSON keep
/// their type, anything else is passed on as text.
pub fn parse_argument(raw: &str) -> Result<(String, FieldValue), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing argument name in '{raw}'"));
    }
    let value = serde_json::from_str::<FieldValue>(value)
        .unwrap_or_else(|_| FieldValue::String(value.to_string()));
    Ok((key.to_string(), value))
}

impl ViabCli {
    pub fn execute(&self) -> Result<()> {
        let engine = viab_core::init(self.config.as_deref())
            .context("failed to initialize the feasibility engine")?;

        match &self.command {
            ViabCommand::Report { project, format, pretty } => {
                self.report(&engine, project, *format, *pretty)
            }
            ViabCommand::New { name, output } => {
                let project = engine.new_project(name.clone());
                write_output(output.as_deref(), &project.to_json_pretty()?)
            }
            ViabCommand::EditShare { project, set, key, percentage, output } => {
                self.edit_share(&engine, project, (*set).into(), key, percentage, output.as_deref())
            }
            ViabCommand::EditFloor {
                project,
                index,
                name,
                kind,
                repeat_count,
                area,
                coefficient,
                counts_as_built,
                output,
            } => {
                let edit = FloorEdit {
                    name: name.clone(),
                    kind: kind.clone(),
                    repeat_count: repeat_count.clone().map(FieldValue::String),
                    raw_area: area.clone().map(FieldValue::String),
                    coefficient: coefficient.clone().map(FieldValue::String),
                    counts_as_built: *counts_as_built,
                };
                self.edit_floor(&engine, project, *index, &edit, output.as_deref())
            }
            ViabCommand::Calc { name, args, list } => calc(name.as_deref(), args, *list),
            ViabCommand::Tables => tables(),
        }
    }

    fn report(
        &self,
        engine: &FeasibilityEngine,
        path: &Path,
        format: OutputFormat,
        pretty: bool,
    ) -> Result<()> {
        let project = load_project(engine, path)?;
        let report = engine.evaluate(&project);

        let rendered = match (format, pretty) {
            (OutputFormat::Text, _) => report.to_string(),
            (OutputFormat::Json, true) => serde_json::to_string_pretty(&report)?,
            (OutputFormat::Json, false) => serde_json::to_string(&report)?,
        };
        println!("{rendered}");
        Ok(())
    }

    fn edit_share(
        &self,
        engine: &FeasibilityEngine,
        path: &Path,
        kind: ShareSetKind,
        key: &str,
        percentage: &str,
        output: Option<&Path>,
    ) -> Result<()> {
        let Some(percentage) = viab_types::parse_decimal(percentage) else {
            bail!("'{percentage}' is not a percentage");
        };

        let mut project = load_project(engine, path)?;
        let outcome = engine
            .edit_share(&mut project, kind, key, percentage)
            .with_context(|| format!("could not set '{key}' in the {} set", kind.label()))?;

        match &outcome.edited {
            Some(edited) => info!(
                share_set = kind.label(),
                key = %edited.key,
                percentage = %format_percent(edited.percentage),
                delta = edited.delta,
                total = %format_percent(project.shares(kind).total()),
                "Share updated"
            ),
            None => info!(share_set = kind.label(), key, "Share already at that percentage"),
        }

        write_output(Some(output.unwrap_or(path)), &project.to_json_pretty()?)
    }

    fn edit_floor(
        &self,
        engine: &FeasibilityEngine,
        path: &Path,
        index: usize,
        edit: &FloorEdit,
        output: Option<&Path>,
    ) -> Result<()> {
        let mut project = load_project(engine, path)?;
        let refused = engine.edit_floor(&mut project, index, edit)?;
        if !refused.is_empty() {
            warn!(index, refused = ?refused, "Some floor fields were left unchanged");
        }
        write_output(Some(output.unwrap_or(path)), &project.to_json_pretty()?)
    }
}

fn load_project(engine: &FeasibilityEngine, path: &Path) -> Result<ProjectRecord> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read project document {}", path.display()))?;
    let project = engine
        .ingest_json(&text)
        .with_context(|| format!("failed to parse project document {}", path.display()))?;
    info!(project_id = project.id, floors = project.floors.len(), "Loaded project");
    Ok(project)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Project written");
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn calc(name: Option<&str>, args: &[(String, FieldValue)], list: bool) -> Result<()> {
    let calculator = FeasibilityCalculator::new();
    if list {
        for available in calculator.available() {
            println!("{available}");
        }
        return Ok(());
    }

    let Some(name) = name else {
        bail!("a formula name is required");
    };
    let result = calculator.evaluate(name, args)?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

fn bounds_json(table: &BoundsTable) -> serde_json::Value {
    table
        .keys()
        .map(|key| {
            let bounds = table.bounds(key);
            json!({ "key": key, "min": bounds.min, "default": bounds.default, "max": bounds.max })
        })
        .collect()
}

fn tables() -> Result<()> {
    let floor_kinds: Vec<_> = FLOOR_KINDS
        .iter()
        .map(|(kind, min, max)| json!({ "kind": kind, "min_coefficient": min, "max_coefficient": max }))
        .collect();
    let monthly: Vec<_> = MONTHLY_SITE_COSTS
        .iter()
        .map(|(key, amount)| json!({ "key": key, "amount": amount }))
        .collect();

    let document = json!({
        "floor_kinds": floor_kinds,
        "direct_cost_stages": bounds_json(&BoundsTable::direct_cost_stages()),
        "indirect_cost_items": bounds_json(&BoundsTable::indirect_cost_items()),
        "monthly_site_costs": monthly,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
