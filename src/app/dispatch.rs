use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::catalog::{self, ProcedureKind};
use crate::cli::{Cli, Commands, HandoffCommands};
use crate::config::Config;
use crate::handoff::{self, HandoffStore, LaunchParams};
use crate::procedure::{AnswerState, Procedure, ProcedureController};
use crate::ui::style as ui;
use crate::ui::view::{print_answers, print_steps};

pub fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Check => run_check(),
        Commands::Steps { kind, answers } => run_steps(kind, &answers),
        Commands::Handoff { handoff_command } => {
            let store = open_store(&config)?;
            match handoff_command {
                HandoffCommands::Write {
                    kind,
                    answers,
                    route,
                } => run_handoff_write(&config, &store, kind, &answers, route.as_deref()),
                HandoffCommands::Read { kind, url } => run_handoff_read(&store, kind, url.as_deref()),
                HandoffCommands::Clear { kind } => {
                    let procedure = kind.procedure()?;
                    store.clear(procedure.handoff())?;
                    println!("  {} cleared {}", ui::success("✓"), procedure.handoff().key());
                    Ok(())
                }
            }
        }
        Commands::Walk { kind, url } => {
            let store = open_store(&config)?;
            super::walk::run_walk(&config, &store, kind, url.as_deref())
        }
    }
}

fn open_store(config: &Config) -> Result<HandoffStore> {
    let storage = handoff::create_storage(&config.handoff, &config.data_dir)
        .context("Failed to open handoff storage")?;
    info!(backend = %storage.name(), "handoff storage ready");
    Ok(HandoffStore::new(storage))
}

fn parse_answers(procedure: &Procedure, raw: &[String]) -> Result<AnswerState> {
    raw.iter()
        .map(|pair| procedure.parse_answer(pair))
        .collect::<Result<Vec<_>>>()
        .map(|pairs| pairs.into_iter().collect())
}

fn run_check() -> Result<()> {
    let procedures = catalog::validate_all()?;
    for (kind, procedure) in &procedures {
        let branch_fields: Vec<&str> = procedure
            .graph()
            .branch_fields()
            .iter()
            .map(String::as_str)
            .collect();
        println!(
            "  {} {kind}: {} base steps, {} guarded, branch fields [{}]",
            ui::success("✓"),
            procedure.build_steps(&AnswerState::new()).len(),
            procedure.guards().guarded_steps().count(),
            branch_fields.join(", ")
        );
    }
    Ok(())
}

fn run_steps(kind: ProcedureKind, raw_answers: &[String]) -> Result<()> {
    let procedure = kind.procedure()?;
    let answers = parse_answers(&procedure, raw_answers)?;
    let steps = procedure.build_steps(&answers);
    println!("  {} ({} steps)", ui::header(procedure.title()), steps.len());
    print_steps(&steps, None);
    Ok(())
}

fn run_handoff_write(
    config: &Config,
    store: &HandoffStore,
    kind: ProcedureKind,
    raw_answers: &[String],
    route: Option<&str>,
) -> Result<()> {
    let procedure = Arc::new(kind.procedure()?);
    let answers = parse_answers(&procedure, raw_answers)?;
    let controller = ProcedureController::with_answers(procedure, answers);
    let url = controller.launch(store, &config.launch.base_url, route.unwrap_or(kind.route()))?;
    println!("  {} payload written", ui::success("✓"));
    println!("  {}", ui::url(url));
    Ok(())
}

fn run_handoff_read(store: &HandoffStore, kind: ProcedureKind, url: Option<&str>) -> Result<()> {
    let procedure = Arc::new(kind.procedure()?);
    let params = match url {
        Some(url) => LaunchParams::from_url(url)?,
        None => LaunchParams::new(),
    };
    let controller = ProcedureController::resume(procedure, store, &params);
    println!("  {}", ui::header(controller.procedure().handoff().key()));
    print_answers(controller.answers());
    println!();
    print_steps(controller.steps(), Some(controller.current_index()));
    Ok(())
}
