//! Step-sequencing state machine.
//!
//! All transitions go through [`reduce`], a pure function of the procedure,
//! the previous session and one event. [`ProcedureController`] is a thin
//! owner around it for callers that want a mutable handle.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use super::answers::AnswerState;
use super::definition::Procedure;
use super::step::Step;
use crate::error::HandoffError;
use crate::handoff::{HandoffStore, LaunchParams, LaunchRequest};

/// Materialized steps plus the cursor. `steps` is never empty and
/// `current_index < steps.len()` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureState {
    steps: Vec<Step>,
    current_index: usize,
}

impl ProcedureState {
    fn new(steps: Vec<Step>) -> Self {
        debug_assert!(!steps.is_empty(), "step graphs never build an empty list");
        Self {
            steps,
            current_index: 0,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self) -> &Step {
        &self.steps[self.current_index]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.steps.len()
    }

    /// Swaps in a rebuilt list, keeping the cursor on the same step id when
    /// it survived, otherwise clamping it into range.
    fn rebuilt(self, steps: Vec<Step>) -> Self {
        if steps == self.steps {
            return self;
        }
        let current_id = &self.steps[self.current_index].id;
        let current_index = steps
            .iter()
            .position(|step| step.id == *current_id)
            .unwrap_or_else(|| self.current_index.min(steps.len() - 1));
        debug!(
            from_len = self.steps.len(),
            to_len = steps.len(),
            from = self.current_index,
            to = current_index,
            "step list rebuilt"
        );
        Self {
            steps,
            current_index,
        }
    }
}

/// What the navigation bar may offer right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigation {
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

impl Navigation {
    fn evaluate(procedure: &Procedure, state: &ProcedureState, answers: &AnswerState) -> Self {
        Self {
            can_go_next: !state.is_last()
                && procedure.allows_leaving(&state.current_step().id, answers),
            can_go_previous: state.current_index > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcedureEvent {
    Next,
    Previous,
    /// Sidebar jump. Not checked against forward guards.
    GoTo(usize),
    SetAnswer { field: String, value: Value },
    ClearAnswer(String),
    MergeAnswers(AnswerState),
}

impl ProcedureEvent {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::SetAnswer {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Everything one procedure window holds.
///
/// Only [`Session::start`] and [`reduce`] produce one, so the step list, the
/// cursor and the navigation flags always agree with the answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    answers: AnswerState,
    state: ProcedureState,
    navigation: Navigation,
}

impl Session {
    pub fn start(procedure: &Procedure, answers: AnswerState) -> Self {
        let state = ProcedureState::new(procedure.build_steps(&answers));
        let navigation = Navigation::evaluate(procedure, &state, &answers);
        Self {
            answers,
            state,
            navigation,
        }
    }

    pub fn answers(&self) -> &AnswerState {
        &self.answers
    }

    pub fn state(&self) -> &ProcedureState {
        &self.state
    }

    pub fn navigation(&self) -> Navigation {
        self.navigation
    }
}

/// Applies one event. Boundary moves, blocked `Next` and out-of-range jumps
/// leave the cursor where it is.
pub fn reduce(procedure: &Procedure, session: &Session, event: ProcedureEvent) -> Session {
    let mut answers = session.answers.clone();
    let mut state = session.state.clone();

    match event {
        ProcedureEvent::Next => {
            if Navigation::evaluate(procedure, &state, &answers).can_go_next {
                state.current_index += 1;
            } else {
                debug!(
                    procedure = %procedure.key(),
                    step = %state.current_step().id,
                    "next ignored"
                );
            }
        }
        ProcedureEvent::Previous => {
            if state.current_index > 0 {
                state.current_index -= 1;
            }
        }
        ProcedureEvent::GoTo(index) => {
            if index < state.len() {
                state.current_index = index;
            } else {
                debug!(
                    procedure = %procedure.key(),
                    index,
                    len = state.len(),
                    "out-of-range jump ignored"
                );
            }
        }
        ProcedureEvent::SetAnswer { field, value } => {
            if answers.set(field.clone(), value) && procedure.graph().is_branch_field(&field) {
                state = state.rebuilt(procedure.build_steps(&answers));
            }
        }
        ProcedureEvent::ClearAnswer(field) => {
            if answers.remove(&field) && procedure.graph().is_branch_field(&field) {
                state = state.rebuilt(procedure.build_steps(&answers));
            }
        }
        ProcedureEvent::MergeAnswers(incoming) => {
            let changed = answers.merge(&incoming);
            if changed
                .iter()
                .any(|field| procedure.graph().is_branch_field(field))
            {
                state = state.rebuilt(procedure.build_steps(&answers));
            }
        }
    }

    let navigation = Navigation::evaluate(procedure, &state, &answers);
    Session {
        answers,
        state,
        navigation,
    }
}

/// One live procedure, e.g. one window of the change-consent wizard.
pub struct ProcedureController {
    id: Uuid,
    procedure: Arc<Procedure>,
    session: Session,
}

impl ProcedureController {
    pub fn start(procedure: Arc<Procedure>) -> Self {
        Self::with_answers(procedure, AnswerState::new())
    }

    pub fn with_answers(procedure: Arc<Procedure>, answers: AnswerState) -> Self {
        let session = Session::start(&procedure, answers);
        let id = Uuid::new_v4();
        info!(
            session = %id,
            procedure = %procedure.key(),
            steps = session.state.len(),
            "procedure started"
        );
        Self {
            id,
            procedure,
            session,
        }
    }

    /// Starts the receiving side of a handoff. Query parameters win over the
    /// stored payload for fields they bind; every other field comes from the
    /// payload or its default.
    pub fn resume(procedure: Arc<Procedure>, store: &HandoffStore, params: &LaunchParams) -> Self {
        let mut answers = store.read(procedure.handoff());
        let overridden = answers.merge(&procedure.answers_from_query(params));
        debug!(
            procedure = %procedure.key(),
            backend = %store.backend(),
            query_fields = ?overridden,
            "resuming from handoff"
        );
        Self::with_answers(procedure, answers)
    }

    /// Writes the handoff subset of the current answers and returns the URL
    /// the second window should open.
    pub fn launch(
        &self,
        store: &HandoffStore,
        base_url: &str,
        route: &str,
    ) -> Result<Url, HandoffError> {
        let schema = self.procedure.handoff();
        store.write(schema, &schema.project(&self.session.answers))?;
        let url = LaunchRequest::new(route)
            .params(self.procedure.query_from_answers(&self.session.answers))
            .to_url(base_url)?;
        info!(session = %self.id, procedure = %self.procedure.key(), url = %url, "procedure launched");
        Ok(url)
    }

    pub fn dispatch(&mut self, event: ProcedureEvent) {
        self.session = reduce(&self.procedure, &self.session, event);
    }

    pub fn next(&mut self) {
        self.dispatch(ProcedureEvent::Next);
    }

    pub fn previous(&mut self) {
        self.dispatch(ProcedureEvent::Previous);
    }

    pub fn go_to(&mut self, index: usize) {
        self.dispatch(ProcedureEvent::GoTo(index));
    }

    pub fn set_answer(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.dispatch(ProcedureEvent::set(field, value));
    }

    pub fn clear_answer(&mut self, field: impl Into<String>) {
        self.dispatch(ProcedureEvent::ClearAnswer(field.into()));
    }

    pub fn merge_answers(&mut self, answers: AnswerState) {
        self.dispatch(ProcedureEvent::MergeAnswers(answers));
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &ProcedureState {
        &self.session.state
    }

    pub fn answers(&self) -> &AnswerState {
        &self.session.answers
    }

    pub fn steps(&self) -> &[Step] {
        self.session.state.steps()
    }

    pub fn current_index(&self) -> usize {
        self.session.state.current_index()
    }

    pub fn current_step(&self) -> &Step {
        self.session.state.current_step()
    }

    pub fn can_go_next(&self) -> bool {
        self.session.navigation.can_go_next
    }

    pub fn can_go_previous(&self) -> bool {
        self.session.navigation.can_go_previous
    }

    /// On the last step the presentation layer runs its completion action
    /// instead of calling `next`.
    pub fn is_on_last_step(&self) -> bool {
        self.session.state.is_last()
    }

    /// 1-based position and total, for "step 3 of 8" labels.
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index() + 1, self.session.state.len())
    }
}
