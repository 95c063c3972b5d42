use anyhow::Result;
use dialoguer::{Input, Select};
use std::sync::Arc;

use crate::catalog::ProcedureKind;
use crate::config::Config;
use crate::handoff::{HandoffStore, LaunchParams};
use crate::procedure::ProcedureController;
use crate::ui::style as ui;
use crate::ui::view::{print_answers, print_navigation, print_step_header, print_steps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    Jump,
    Answer,
    Show,
    Launch,
    Quit,
}

impl Action {
    const ALL: [Self; 7] = [
        Self::Next,
        Self::Previous,
        Self::Jump,
        Self::Answer,
        Self::Show,
        Self::Launch,
        Self::Quit,
    ];

    fn label(self, controller: &ProcedureController) -> String {
        match self {
            Self::Next if controller.is_on_last_step() => "Complete".into(),
            Self::Next if !controller.can_go_next() => ui::dim("Next (blocked)"),
            Self::Next => "Next".into(),
            Self::Previous if !controller.can_go_previous() => ui::dim("Previous"),
            Self::Previous => "Previous".into(),
            Self::Jump => "Jump to step".into(),
            Self::Answer => "Set answer".into(),
            Self::Show => "Show answers".into(),
            Self::Launch => "Open in second window".into(),
            Self::Quit => "Quit".into(),
        }
    }
}

/// Converts a 1-based step number as typed into a cursor index. `0` names no
/// step.
fn step_index(position: usize) -> Option<usize> {
    position.checked_sub(1)
}

/// Terminal stand-in for the presentation layer: renders the current step,
/// writes answers back and drives navigation.
pub fn run_walk(
    config: &Config,
    store: &HandoffStore,
    kind: ProcedureKind,
    url: Option<&str>,
) -> Result<()> {
    let procedure = Arc::new(kind.procedure()?);
    let mut controller = match url {
        Some(url) => ProcedureController::resume(procedure, store, &LaunchParams::from_url(url)?),
        None => ProcedureController::start(procedure),
    };

    loop {
        print_step_header(&controller);
        print_navigation(&controller);

        let labels: Vec<String> = Action::ALL
            .iter()
            .map(|action| action.label(&controller))
            .collect();
        let choice = Select::new()
            .with_prompt("  Action")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[choice] {
            Action::Next if controller.is_on_last_step() => {
                println!("  {} {} complete", ui::success("✓"), controller.procedure().title());
                print_answers(controller.answers());
                return Ok(());
            }
            Action::Next => controller.next(),
            Action::Previous => controller.previous(),
            Action::Jump => {
                print_steps(controller.steps(), Some(controller.current_index()));
                let position: usize = Input::new()
                    .with_prompt("  Step number")
                    .interact_text()?;
                match step_index(position) {
                    Some(index) => controller.go_to(index),
                    None => println!("  {} steps are numbered from 1", ui::yellow("!")),
                }
            }
            Action::Answer => {
                let raw: String = Input::new()
                    .with_prompt("  field=value")
                    .interact_text()?;
                match controller.procedure().parse_answer(&raw) {
                    Ok((field, value)) => controller.set_answer(field, value),
                    Err(error) => println!("  {} {error}", ui::yellow("!")),
                }
            }
            Action::Show => print_answers(controller.answers()),
            Action::Launch => match controller.launch(store, &config.launch.base_url, kind.route()) {
                Ok(url) => println!("  {} {}", ui::success("✓"), ui::url(url)),
                Err(error) => println!("  {} {error}", ui::yellow("!")),
            },
            Action::Quit => return Ok(()),
        }
    }
}
