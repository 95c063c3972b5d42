pub mod answers;
pub mod controller;
pub mod definition;
pub mod graph;
pub mod guard;
pub mod step;

pub use answers::{AnswerState, parse_answer_pair};
pub use controller::{
    Navigation, ProcedureController, ProcedureEvent, ProcedureState, Session, reduce,
};
pub use definition::{Procedure, ProcedureBuilder, QueryBinding};
pub use graph::{Anchor, Condition, ExtensionRule, StepGraph};
pub use guard::{Guard, GuardFn, GuardRegistry};
pub use step::{Step, steps};
