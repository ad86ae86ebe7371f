//! Quality dashboard CLI entry point.
//!
//! # Responsibility
//! - Parse flags, open the database and dispatch to core services.
//! - Render results as plain text or JSON.
//!
//! # Invariants
//! - All scoring and propagation logic stays in `qualitydash_core`.
//! - Failures exit with status 1 after printing one error line.

mod cli;

use clap::Parser;
use cli::{
    Cli, Commands, CommitmentCommands, ConditionCommands, CycleCommands, LevelCommands,
    ObjectiveCommands, ProjectCommands, ReasonCommands, SnapshotCommands,
};
use log::info;
use qualitydash_core::{
    default_log_level, init_logging, open_db, CatalogService, Condition, FrameworkRepository,
    FreshnessPolicy, LedgerService, Level, Objective, ObjectiveGroup, ObjectiveStatusRow, Project,
    ProjectRepository, QualitySnapshot, Reason, ReconcileReport, ReconcileService,
    ReviewFreshness, ScoringService, SnapshotService, SqliteFrameworkRepository,
    SqliteProjectRepository, WorkCycle, SNAPSHOT_APPLIED_MESSAGE,
};
use serde::Serialize;
use serde_json::json;
use std::error::Error;
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Serialize)]
struct StatusView {
    project: Project,
    quality_indicator: i64,
    review_freshness: Option<ReviewFreshness>,
    objectives: Vec<ObjectiveStatusRow>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli.json {
                println!("{}", json!({ "error": err.to_string() }));
            } else {
                eprintln!("error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult {
    let conn = open_db(&cli.db)?;
    let framework = SqliteFrameworkRepository::try_new(&conn)?;
    let projects = SqliteProjectRepository::try_new(&conn)?;
    let catalog = CatalogService::new(&framework, &projects);
    let ledger = LedgerService::new(&framework, &projects);

    match &cli.command {
        Commands::Init => {
            let report = ReconcileService::new(&framework, &projects).reconcile_all()?;
            info!(
                "event=cli_init module=cli status=ok created={}",
                report.total()
            );
            print_report(cli.json, "database ready", &report)
        }
        Commands::Level(LevelCommands::Add { name, value }) => {
            let level = Level::new(name.as_str(), *value);
            let report = catalog.create_level(&level)?;
            print_created(cli.json, "level", level.id, &report)
        }
        Commands::Reason(ReasonCommands::Add { name, value }) => {
            let reason = Reason::new(name.as_str(), *value);
            catalog.create_reason(&reason)?;
            print_created(cli.json, "reason", reason.id, &ReconcileReport::default())
        }
        Commands::Reason(ReasonCommands::Select {
            project_objective_id,
            reason_id,
        }) => {
            ledger.select_unstarted_reason(*project_objective_id, *reason_id)?;
            print_line(
                cli.json,
                json!({ "project_objective_id": project_objective_id, "reason_id": reason_id }),
                match reason_id {
                    Some(id) => format!("reason {id} selected"),
                    None => "reason cleared".to_string(),
                },
            )
        }
        Commands::Objective(ObjectiveCommands::Add {
            name,
            weight,
            group,
            description,
        }) => {
            let mut objective = Objective::new(name.as_str(), *weight);
            objective.description = description.clone();
            if let Some(group_name) = group {
                objective.group_id = Some(find_or_create_group(&framework, &catalog, group_name)?);
            }
            let report = catalog.create_objective(&objective)?;
            print_created(cli.json, "objective", objective.id, &report)
        }
        Commands::Condition(ConditionCommands::Add {
            objective_id,
            level_id,
            name,
        }) => {
            let condition = Condition::new(*objective_id, *level_id, name.as_str());
            let report = catalog.create_condition(&condition)?;
            print_created(cli.json, "condition", condition.id, &report)
        }
        Commands::Condition(ConditionCommands::Toggle { entry_id, status }) => {
            let stored = ledger.toggle_condition_status(*entry_id, *status)?;
            print_line(
                cli.json,
                json!({ "entry_id": entry_id, "status": stored }),
                format!("entry {entry_id} is now {}", stored.as_str()),
            )
        }
        Commands::Cycle(CycleCommands::Add {
            name,
            started_on,
            current,
        }) => {
            let mut work_cycle = WorkCycle::new(name.as_str(), *started_on);
            work_cycle.is_current = *current;
            let report = catalog.create_work_cycle(&work_cycle)?;
            print_created(cli.json, "work cycle", work_cycle.id, &report)
        }
        Commands::Project(ProjectCommands::Add {
            name,
            owner,
            driver,
            url,
        }) => {
            let mut project = Project::new(name.as_str());
            project.owner = owner.clone();
            project.driver = driver.clone();
            project.url = url.clone().unwrap_or_default();
            let report = catalog.create_project(&project)?;
            print_created(cli.json, "project", project.id, &report)
        }
        Commands::Commitment(CommitmentCommands::Toggle { commitment_id }) => {
            let committed = ledger.toggle_commitment(*commitment_id)?;
            print_line(
                cli.json,
                json!({ "commitment_id": commitment_id, "committed": committed }),
                format!("commitment {commitment_id} committed={committed}"),
            )
        }
        Commands::Status { project_id } => {
            let scoring = ScoringService::new(&framework, &projects);
            let quality_indicator = scoring.quality_indicator(*project_id)?;
            let project = projects
                .get_project(*project_id)?
                .ok_or_else(|| format!("project not found: {project_id}"))?;
            let today = chrono::Local::now().date_naive();
            let view = StatusView {
                review_freshness: project.review_freshness(today, &FreshnessPolicy::default()),
                project,
                quality_indicator,
                objectives: scoring.objective_statuses(*project_id)?,
            };
            print_status(cli.json, &view)
        }
        Commands::Snapshot(SnapshotCommands::Apply { work_cycle_id }) => {
            let updated =
                SnapshotService::new(&framework, &projects).apply_snapshot(*work_cycle_id)?;
            print_line(
                cli.json,
                json!({ "work_cycle_id": work_cycle_id, "updated": updated, "message": SNAPSHOT_APPLIED_MESSAGE }),
                SNAPSHOT_APPLIED_MESSAGE.to_string(),
            )
        }
        Commands::Snapshot(SnapshotCommands::History { project_id }) => {
            let history =
                SnapshotService::new(&framework, &projects).quality_history(*project_id)?;
            print_history(cli.json, &framework, &history)
        }
    }
}

fn find_or_create_group(
    framework: &SqliteFrameworkRepository<'_>,
    catalog: &CatalogService<&SqliteFrameworkRepository<'_>, &SqliteProjectRepository<'_>>,
    name: &str,
) -> Result<uuid::Uuid, Box<dyn Error>> {
    if let Some(existing) = framework
        .list_objective_groups()?
        .into_iter()
        .find(|group| group.name == name)
    {
        return Ok(existing.id);
    }
    let group = ObjectiveGroup::new(name);
    catalog.create_objective_group(&group)?;
    Ok(group.id)
}

fn print_line(as_json: bool, value: serde_json::Value, text: String) -> CliResult {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{text}");
    }
    Ok(())
}

fn print_created(
    as_json: bool,
    entity: &str,
    id: uuid::Uuid,
    report: &ReconcileReport,
) -> CliResult {
    print_line(
        as_json,
        json!({ "entity": entity, "id": id, "reconciled": report }),
        format!("created {entity} {id} ({} rows reconciled)", report.total()),
    )
}

fn print_report(as_json: bool, headline: &str, report: &ReconcileReport) -> CliResult {
    print_line(
        as_json,
        json!({ "message": headline, "reconciled": report }),
        format!(
            "{headline}: {} project objectives, {} condition entries, {} commitments, {} snapshots created",
            report.project_objectives,
            report.condition_entries,
            report.commitments,
            report.quality_snapshots
        ),
    )
}

fn print_status(as_json: bool, view: &StatusView) -> CliResult {
    if as_json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    println!("{} ({})", view.project.name, view.project.id);
    println!("QI: {}", view.quality_indicator);
    match view.review_freshness {
        Some(freshness) => println!("review: {freshness:?}"),
        None => println!("review: never"),
    }
    for row in &view.objectives {
        let status = row
            .status
            .as_ref()
            .map(|status| status.name().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<32} weight={:<4} {}  [{}]",
            row.objective.name, row.objective.weight, status, row.project_objective.id
        );
    }
    Ok(())
}

fn print_history<F: FrameworkRepository>(
    as_json: bool,
    framework: &F,
    history: &[QualitySnapshot],
) -> CliResult {
    if as_json {
        println!("{}", serde_json::to_string_pretty(history)?);
        return Ok(());
    }

    for snapshot in history {
        let cycle = framework
            .get_work_cycle(snapshot.work_cycle_id)?
            .map(|work_cycle| format!("{} ({})", work_cycle.name, work_cycle.started_on))
            .unwrap_or_else(|| snapshot.work_cycle_id.to_string());
        println!("{cycle}: {}", snapshot.value);
    }
    Ok(())
}
