use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::answers::AnswerState;

pub type GuardFn = fn(&AnswerState) -> bool;

/// Predicate that must hold before the user may leave a step.
#[derive(Clone)]
pub enum Guard {
    /// A drawn signature has been captured (`field` is `true`).
    Signature(String),
    /// Every listed checkbox is ticked.
    AllChecked(Vec<String>),
    /// Free text is present and not blank.
    Filled(String),
    /// A numeric amount is present and strictly positive.
    PositiveAmount(String),
    Custom { name: &'static str, check: GuardFn },
}

impl Guard {
    pub fn signature(field: impl Into<String>) -> Self {
        Self::Signature(field.into())
    }

    pub fn all_checked(fields: &[&str]) -> Self {
        Self::AllChecked(fields.iter().map(|field| (*field).to_string()).collect())
    }

    pub fn filled(field: impl Into<String>) -> Self {
        Self::Filled(field.into())
    }

    pub fn positive_amount(field: impl Into<String>) -> Self {
        Self::PositiveAmount(field.into())
    }

    pub fn allows(&self, answers: &AnswerState) -> bool {
        match self {
            Self::Signature(field) => answers.flag(field),
            Self::AllChecked(fields) => fields.iter().all(|field| answers.flag(field)),
            Self::Filled(field) => is_filled(answers.get(field)),
            Self::PositiveAmount(field) => parse_amount(answers.get(field)).is_some_and(|n| n > 0.0),
            Self::Custom { check, .. } => check(answers),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature(field) => f.debug_tuple("Signature").field(field).finish(),
            Self::AllChecked(fields) => f.debug_tuple("AllChecked").field(fields).finish(),
            Self::Filled(field) => f.debug_tuple("Filled").field(field).finish(),
            Self::PositiveAmount(field) => f.debug_tuple("PositiveAmount").field(field).finish(),
            Self::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
        }
    }
}

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

/// Empty strings and unparseable text are invalid, never zero.
pub fn parse_amount(value: Option<&Value>) -> Option<f64> {
    let amount = match value? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            strip_grouping(text)?.parse::<f64>().ok()?
        }
        _ => return None,
    };
    amount.is_finite().then_some(amount)
}

/// Removes thousands separators from `1,250,000.5`-style text. Commas
/// anywhere else make the text unparseable.
fn strip_grouping(text: &str) -> Option<String> {
    if !text.contains(',') {
        return Some(text.to_string());
    }
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };
    if fraction.is_some_and(|fraction| fraction.contains(',')) {
        return None;
    }
    let (sign, digits) = match integer.strip_prefix(['-', '+']) {
        Some(rest) => (&integer[..1], rest),
        None => ("", integer),
    };

    let mut groups = digits.split(',');
    let lead = groups.next()?;
    let lead_ok = (1..=3).contains(&lead.len()) && lead.bytes().all(|b| b.is_ascii_digit());
    if !lead_ok || !groups.all(|group| group.len() == 3 && group.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let mut plain = format!("{sign}{}", digits.replace(',', ""));
    if let Some(fraction) = fraction {
        plain.push('.');
        plain.push_str(fraction);
    }
    Some(plain)
}

/// Guards keyed by step id. A step with no entry may always be left.
#[derive(Debug, Clone, Default)]
pub struct GuardRegistry {
    guards: BTreeMap<String, Vec<Guard>>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a guard to `step`. Guards on the same step combine with AND.
    pub fn register(mut self, step: impl Into<String>, guard: Guard) -> Self {
        self.guards.entry(step.into()).or_default().push(guard);
        self
    }

    pub fn allows(&self, step: &str, answers: &AnswerState) -> bool {
        self.guards
            .get(step)
            .is_none_or(|guards| guards.iter().all(|guard| guard.allows(answers)))
    }

    pub fn guards_for(&self, step: &str) -> &[Guard] {
        self.guards.get(step).map_or(&[], Vec::as_slice)
    }

    pub fn guarded_steps(&self) -> impl Iterator<Item = &str> {
        self.guards.keys().map(String::as_str)
    }
}
