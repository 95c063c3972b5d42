//! Declarative step graph.
//!
//! A procedure is a fixed list of base steps plus extension rules. Each rule
//! splices extra steps after an anchor when its condition holds over the
//! current answers. Rules are evaluated in declared order, so the same
//! answers always yield the same list.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use super::answers::AnswerState;
use super::step::Step;
use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Start,
    After(String),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::After(id) => f.write_str(id),
        }
    }
}

/// Conjunction of `field == value` clauses.
///
/// An unset field satisfies no clause, so a rule gated on a field that has
/// not been answered yet never fires.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    clauses: Vec<(String, Value)>,
}

impl Condition {
    pub fn always() -> Self {
        Self::default()
    }

    pub fn when(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::always().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn holds(&self, answers: &AnswerState) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| answers.get(field) == Some(expected))
    }

    /// True when no answer state can satisfy both conditions, i.e. some field
    /// is pinned to different values by each side.
    pub fn excludes(&self, other: &Condition) -> bool {
        self.clauses.iter().any(|(field, value)| {
            other
                .clauses
                .iter()
                .any(|(other_field, other_value)| other_field == field && other_value != value)
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.clauses.iter().map(|(field, _)| field.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ExtensionRule {
    pub name: String,
    pub anchor: Anchor,
    pub when: Condition,
    pub steps: Vec<Step>,
}

impl ExtensionRule {
    pub fn after(
        name: impl Into<String>,
        anchor: impl Into<String>,
        when: Condition,
        steps: Vec<Step>,
    ) -> Self {
        Self {
            name: name.into(),
            anchor: Anchor::After(anchor.into()),
            when,
            steps,
        }
    }

    pub fn at_start(name: impl Into<String>, when: Condition, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            anchor: Anchor::Start,
            when,
            steps,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepGraph {
    base: Vec<Step>,
    rules: Vec<ExtensionRule>,
    branch_fields: BTreeSet<String>,
}

impl StepGraph {
    /// Validates the table and returns the graph. Any conflict is a catalog
    /// bug and is reported when the catalog is constructed, never while
    /// navigating.
    pub fn new(
        procedure: &str,
        base: Vec<Step>,
        rules: Vec<ExtensionRule>,
    ) -> Result<Self, CatalogError> {
        validate(procedure, &base, &rules)?;

        let branch_fields = rules
            .iter()
            .flat_map(|rule| rule.when.fields().map(str::to_string))
            .collect();

        Ok(Self {
            base,
            rules,
            branch_fields,
        })
    }

    /// Materializes the step list for `answers`. Never empty; the last step
    /// is flagged terminal.
    pub fn build(&self, answers: &AnswerState) -> Vec<Step> {
        let mut steps = Vec::with_capacity(self.base.len());
        self.splice(&Anchor::Start, answers, &mut steps);
        for step in &self.base {
            steps.push(step.clone().terminal(false));
            self.splice(&Anchor::After(step.id.clone()), answers, &mut steps);
        }

        let last = steps.len() - 1;
        for (index, step) in steps.iter_mut().enumerate() {
            step.is_terminal = index == last;
        }
        steps
    }

    fn splice(&self, anchor: &Anchor, answers: &AnswerState, out: &mut Vec<Step>) {
        for rule in self.rules.iter().filter(|rule| rule.anchor == *anchor) {
            if rule.when.holds(answers) {
                out.extend(rule.steps.iter().map(|step| step.clone().terminal(false)));
            }
        }
    }

    /// Fields whose value can change which steps exist.
    pub fn branch_fields(&self) -> &BTreeSet<String> {
        &self.branch_fields
    }

    pub fn is_branch_field(&self, field: &str) -> bool {
        self.branch_fields.contains(field)
    }

    /// Every step id the graph can ever produce.
    pub fn step_ids(&self) -> BTreeSet<&str> {
        self.base
            .iter()
            .chain(self.rules.iter().flat_map(|rule| rule.steps.iter()))
            .map(|step| step.id.as_str())
            .collect()
    }
}

fn validate(procedure: &str, base: &[Step], rules: &[ExtensionRule]) -> Result<(), CatalogError> {
    if base.is_empty() {
        return Err(CatalogError::Empty {
            procedure: procedure.to_string(),
        });
    }

    let all_steps = base.iter().chain(rules.iter().flat_map(|rule| rule.steps.iter()));
    for step in all_steps {
        if step.id.trim().is_empty() {
            return Err(CatalogError::EmptyStepId {
                procedure: procedure.to_string(),
            });
        }
    }

    let mut base_ids = BTreeSet::new();
    for step in base {
        if !base_ids.insert(step.id.as_str()) {
            return Err(duplicate(procedure, &step.id));
        }
    }

    for rule in rules {
        if let Anchor::After(anchor) = &rule.anchor
            && !base_ids.contains(anchor.as_str())
        {
            return Err(CatalogError::UnknownAnchor {
                rule: rule.name.clone(),
                anchor: anchor.clone(),
            });
        }

        let mut rule_ids = BTreeSet::new();
        for step in &rule.steps {
            if base_ids.contains(step.id.as_str()) || !rule_ids.insert(step.id.as_str()) {
                return Err(duplicate(procedure, &step.id));
            }
        }
    }

    for (index, first) in rules.iter().enumerate() {
        for second in &rules[index + 1..] {
            if first.when.excludes(&second.when) {
                continue;
            }

            if first.anchor == second.anchor {
                return Err(CatalogError::OverlappingRules {
                    first: first.name.clone(),
                    second: second.name.clone(),
                    anchor: first.anchor.to_string(),
                });
            }

            // Both rules can fire together, so their steps must not collide.
            if let Some(step) = first
                .steps
                .iter()
                .find(|step| second.steps.iter().any(|other| other.id == step.id))
            {
                return Err(duplicate(procedure, &step.id));
            }
        }
    }

    Ok(())
}

fn duplicate(procedure: &str, step: &str) -> CatalogError {
    CatalogError::DuplicateStep {
        procedure: procedure.to_string(),
        step: step.to_string(),
    }
}
