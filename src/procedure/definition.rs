use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use super::answers::{AnswerState, parse_answer_pair};
use super::graph::{ExtensionRule, StepGraph};
use super::guard::{Guard, GuardRegistry};
use super::step::Step;
use crate::error::CatalogError;
use crate::handoff::{FieldSpec, HandoffSchema, LaunchParams};

/// Maps a launch URL query parameter onto an answer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBinding {
    pub param: String,
    pub field: String,
}

/// A validated procedure: its step graph, advance guards and handoff
/// contract. Construct through [`Procedure::builder`].
#[derive(Debug, Clone)]
pub struct Procedure {
    key: String,
    title: String,
    graph: StepGraph,
    guards: GuardRegistry,
    handoff: HandoffSchema,
    query_bindings: Vec<QueryBinding>,
}

impl Procedure {
    pub fn builder(key: impl Into<String>) -> ProcedureBuilder {
        ProcedureBuilder::new(key.into())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    pub fn guards(&self) -> &GuardRegistry {
        &self.guards
    }

    pub fn handoff(&self) -> &HandoffSchema {
        &self.handoff
    }

    pub fn query_bindings(&self) -> &[QueryBinding] {
        &self.query_bindings
    }

    pub fn build_steps(&self, answers: &AnswerState) -> Vec<Step> {
        self.graph.build(answers)
    }

    pub fn allows_leaving(&self, step: &str, answers: &AnswerState) -> bool {
        self.guards.allows(step, answers)
    }

    /// Answers carried by launch query parameters. These take precedence
    /// over a stored handoff payload for the same field.
    pub fn answers_from_query(&self, params: &LaunchParams) -> AnswerState {
        let mut answers = AnswerState::new();
        for binding in &self.query_bindings {
            let (Some(raw), Some(spec)) = (
                params.get(&binding.param),
                self.handoff.field(&binding.field),
            ) else {
                continue;
            };
            match spec.kind.coerce_query(raw) {
                Some(value) => {
                    answers.set(binding.field.clone(), value);
                }
                None => debug!(
                    procedure = %self.key,
                    param = %binding.param,
                    value = %raw,
                    "ignoring launch parameter outside field domain"
                ),
            }
        }
        answers
    }

    /// Parses a typed-in `field=value` answer. A handoff field keeps the
    /// literal text when the JSON reading does not fit its kind, so
    /// `project_id=1042` stays text.
    pub fn parse_answer(&self, pair: &str) -> anyhow::Result<(String, Value)> {
        let (field, value) = parse_answer_pair(pair)?;
        let Some(spec) = self.handoff.field(&field) else {
            return Ok((field, value));
        };
        if spec.kind.accepts(&value) {
            return Ok((field, value));
        }
        let raw = pair.split_once('=').map_or("", |(_, raw)| raw);
        let value = spec.kind.coerce_query(raw).unwrap_or(value);
        Ok((field, value))
    }

    /// Query parameters a launch should carry, read from the current answers.
    pub fn query_from_answers(&self, answers: &AnswerState) -> Vec<(String, String)> {
        self.query_bindings
            .iter()
            .filter_map(|binding| {
                let value = answers.get(&binding.field)?;
                let text = value
                    .as_str()
                    .map_or_else(|| value.to_string(), str::to_string);
                Some((binding.param.clone(), text))
            })
            .collect()
    }
}

pub struct ProcedureBuilder {
    key: String,
    title: Option<String>,
    base: Vec<Step>,
    rules: Vec<ExtensionRule>,
    guards: GuardRegistry,
    handoff_version: u32,
    handoff_fields: Vec<FieldSpec>,
    query_bindings: Vec<QueryBinding>,
}

impl ProcedureBuilder {
    fn new(key: String) -> Self {
        Self {
            key,
            title: None,
            base: Vec::new(),
            rules: Vec::new(),
            guards: GuardRegistry::new(),
            handoff_version: crate::handoff::PAYLOAD_VERSION,
            handoff_fields: Vec::new(),
            query_bindings: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn base(mut self, steps: Vec<Step>) -> Self {
        self.base.extend(steps);
        self
    }

    pub fn rule(mut self, rule: ExtensionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn guard(mut self, step: impl Into<String>, guard: Guard) -> Self {
        self.guards = self.guards.register(step, guard);
        self
    }

    pub fn handoff_version(mut self, version: u32) -> Self {
        self.handoff_version = version;
        self
    }

    pub fn handoff_field(mut self, field: FieldSpec) -> Self {
        self.handoff_fields.push(field);
        self
    }

    pub fn bind_query(mut self, param: impl Into<String>, field: impl Into<String>) -> Self {
        self.query_bindings.push(QueryBinding {
            param: param.into(),
            field: field.into(),
        });
        self
    }

    pub fn build(self) -> Result<Procedure, CatalogError> {
        let graph = StepGraph::new(&self.key, self.base, self.rules)?;

        let known: BTreeSet<&str> = graph.step_ids();
        if let Some(step) = self.guards.guarded_steps().find(|step| !known.contains(step)) {
            return Err(CatalogError::UnknownGuardStep {
                step: step.to_string(),
            });
        }

        let handoff = HandoffSchema::new(self.key.clone(), self.handoff_version, self.handoff_fields)?;

        if let Some(binding) = self
            .query_bindings
            .iter()
            .find(|binding| handoff.field(&binding.field).is_none())
        {
            return Err(CatalogError::UnboundQueryField {
                param: binding.param.clone(),
                field: binding.field.clone(),
            });
        }

        Ok(Procedure {
            title: self.title.unwrap_or_else(|| self.key.clone()),
            key: self.key,
            graph,
            guards: self.guards,
            handoff,
            query_bindings: self.query_bindings,
        })
    }
}
