use crate::procedure::{AnswerState, ProcedureController, Step};

use super::style as ui;

pub fn print_step_header(controller: &ProcedureController) {
    let (current, total) = controller.progress();
    println!();
    println!(
        "  {} {}",
        ui::accent(format!("[{current}/{total}]")),
        ui::header(&controller.current_step().title)
    );
    println!("  {}", ui::dim("─".repeat(50)));
}

/// Sidebar-style listing; `current` gets a marker.
pub fn print_steps(steps: &[Step], current: Option<usize>) {
    for (index, step) in steps.iter().enumerate() {
        let marker = if Some(index) == current {
            ui::accent("›")
        } else {
            " ".to_string()
        };
        let terminal = if step.is_terminal {
            format!(" {}", ui::dim("(last)"))
        } else {
            String::new()
        };
        println!(
            "  {marker} {:>2}. {} {}{terminal}",
            index + 1,
            step.title,
            ui::dim(&step.id)
        );
    }
}

pub fn print_answers(answers: &AnswerState) {
    if answers.is_empty() {
        println!("  {}", ui::dim("(no answers)"));
        return;
    }
    for (field, value) in answers.iter() {
        println!("    › {field} = {}", ui::value(value));
    }
}

pub fn print_navigation(controller: &ProcedureController) {
    let next = if controller.can_go_next() {
        ui::success("next")
    } else if controller.is_on_last_step() {
        ui::dim("next (last step)")
    } else {
        ui::yellow("next (required answers missing)")
    };
    let previous = if controller.can_go_previous() {
        ui::success("previous")
    } else {
        ui::dim("previous")
    };
    println!("  {previous} | {next}");
}
