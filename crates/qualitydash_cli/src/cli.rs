//! CLI type definitions.
//!
//! Every global flag can also be supplied through a `QUALITYDASH_*`
//! environment variable.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use qualitydash_core::ConditionStatus;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "qualitydash")]
#[command(about = "Quality dashboard: levels, commitments and QI snapshots", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database file
    #[arg(long, global = true, env = "QUALITYDASH_DB", default_value = "qualitydash.sqlite3")]
    pub db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "QUALITYDASH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotated log files; logging is off when unset
    #[arg(long, global = true, env = "QUALITYDASH_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or migrate the database and backfill missing rows
    Init,

    /// Level management
    #[command(subcommand)]
    Level(LevelCommands),

    /// Unstarted reason management
    #[command(subcommand)]
    Reason(ReasonCommands),

    /// Objective management
    #[command(subcommand)]
    Objective(ObjectiveCommands),

    /// Condition management and ledger updates
    #[command(subcommand)]
    Condition(ConditionCommands),

    /// Work cycle management
    #[command(subcommand)]
    Cycle(CycleCommands),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Commitment updates
    #[command(subcommand)]
    Commitment(CommitmentCommands),

    /// Show objective statuses, QI and review freshness of a project
    Status {
        project_id: Uuid,
    },

    /// Quality indicator snapshots
    #[command(subcommand)]
    Snapshot(SnapshotCommands),
}

#[derive(Subcommand)]
pub enum LevelCommands {
    /// Add a level; its value orders it among the others
    Add { name: String, value: i32 },
}

#[derive(Subcommand)]
pub enum ReasonCommands {
    /// Add an unstarted reason
    Add { name: String, value: i32 },

    /// Set or clear the unstarted reason of a project objective
    Select {
        project_objective_id: Uuid,
        reason_id: Option<Uuid>,
    },
}

#[derive(Subcommand)]
pub enum ObjectiveCommands {
    /// Add an objective and link it to every project
    Add {
        name: String,
        weight: i32,

        /// Objective group name, created when missing
        #[arg(short, long)]
        group: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConditionCommands {
    /// Add a condition gating one level of one objective
    Add {
        objective_id: Uuid,
        level_id: Uuid,
        name: String,
    },

    /// Toggle a ledger entry toward a status, or back to unset
    Toggle {
        entry_id: Uuid,

        /// done|candidate|not_applicable|unset
        #[arg(value_parser = parse_status)]
        status: ConditionStatus,
    },
}

#[derive(Subcommand)]
pub enum CycleCommands {
    /// Add a work cycle starting on YYYY-MM-DD
    Add {
        name: String,
        started_on: NaiveDate,

        /// Mark the new cycle as the current one
        #[arg(long)]
        current: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Add a project and build its matrix
    Add {
        name: String,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        driver: Option<String>,

        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CommitmentCommands {
    /// Flip the committed flag of a commitment
    Toggle { commitment_id: Uuid },
}

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Copy every project's current QI into the cycle's snapshots
    Apply { work_cycle_id: Uuid },

    /// Show a project's QI snapshots by cycle
    History { project_id: Uuid },
}

fn parse_status(value: &str) -> Result<ConditionStatus, String> {
    ConditionStatus::parse(&value.trim().to_ascii_lowercase()).ok_or_else(|| {
        format!("unknown status `{value}`; expected done|candidate|not_applicable|unset")
    })
}
