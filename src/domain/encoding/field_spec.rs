// ============================================================
// FIELD SPEC
// ============================================================
// Declarative rule for encoding one categorical column

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::UNMAPPED_CODE;
use crate::domain::error::{AppError, Result};
use crate::domain::table::CellValue;

/// One label of a lookup field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub label: String,
    pub code: i64,
}

/// Comparison applied between a cell value and a breakpoint cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// value <= cutoff
    AtMost,
    /// value < cutoff
    Below,
    /// value >= cutoff
    AtLeast,
    /// value > cutoff
    Above,
}

impl Comparison {
    pub fn matches(self, value: f64, cutoff: f64) -> bool {
        match self {
            Comparison::AtMost => value <= cutoff,
            Comparison::Below => value < cutoff,
            Comparison::AtLeast => value >= cutoff,
            Comparison::Above => value > cutoff,
        }
    }

    /// Upper bounds must be declared with increasing cutoffs, lower bounds
    /// with decreasing ones.
    pub fn is_upper_bound(self) -> bool {
        matches!(self, Comparison::AtMost | Comparison::Below)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::AtMost => "<=",
            Comparison::Below => "<",
            Comparison::AtLeast => ">=",
            Comparison::Above => ">",
        }
    }
}

/// A single `value <op> cutoff -> code` rule of a threshold field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub op: Comparison,
    pub cutoff: f64,
    pub code: i64,
}

impl Breakpoint {
    pub fn at_most(cutoff: f64, code: i64) -> Self {
        Self {
            op: Comparison::AtMost,
            cutoff,
            code,
        }
    }

    pub fn below(cutoff: f64, code: i64) -> Self {
        Self {
            op: Comparison::Below,
            cutoff,
            code,
        }
    }

    pub fn at_least(cutoff: f64, code: i64) -> Self {
        Self {
            op: Comparison::AtLeast,
            cutoff,
            code,
        }
    }

    pub fn above(cutoff: f64, code: i64) -> Self {
        Self {
            op: Comparison::Above,
            cutoff,
            code,
        }
    }
}

/// How a field turns a raw value into a code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Exact label match over a finite mapping
    Lookup { entries: Vec<LookupEntry> },

    /// Ordered numeric breakpoints, first match wins, else `otherwise`
    Threshold {
        breakpoints: Vec<Breakpoint>,
        otherwise: i64,
    },
}

/// Declarative encoding rule for one column.
///
/// A spec is inert until it passes [`FieldSpec::compile`], which is where all
/// configuration errors surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    #[serde(flatten)]
    pub kind: FieldKind,

    /// Codes this field may produce. Derived from the rule when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codomain: Option<BTreeSet<i64>>,
}

impl FieldSpec {
    pub fn lookup(name: &str, entries: &[(&str, i64)]) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Lookup {
                entries: entries
                    .iter()
                    .map(|(label, code)| LookupEntry {
                        label: label.to_string(),
                        code: *code,
                    })
                    .collect(),
            },
            codomain: None,
        }
    }

    pub fn threshold(name: &str, breakpoints: Vec<Breakpoint>, otherwise: i64) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Threshold {
                breakpoints,
                otherwise,
            },
            codomain: None,
        }
    }

    pub fn with_codomain(mut self, codes: &[i64]) -> Self {
        self.codomain = Some(codes.iter().copied().collect());
        self
    }

    /// Every code the rule can emit for recognized input
    pub fn producible_codes(&self) -> BTreeSet<i64> {
        match &self.kind {
            FieldKind::Lookup { entries } => entries.iter().map(|entry| entry.code).collect(),
            FieldKind::Threshold {
                breakpoints,
                otherwise,
            } => breakpoints
                .iter()
                .map(|breakpoint| breakpoint.code)
                .chain(std::iter::once(*otherwise))
                .collect(),
        }
    }

    /// Validate the rule and build its lookup index
    pub fn compile(self) -> Result<FieldRule> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::ConfigurationError(
                "field name must not be empty".to_string(),
            ));
        }
        if name != self.name {
            return Err(AppError::ConfigurationError(format!(
                "field name '{}' has leading or trailing whitespace",
                self.name
            )));
        }

        let index = match &self.kind {
            FieldKind::Lookup { entries } => Self::build_lookup_index(&self.name, entries)?,
            FieldKind::Threshold { breakpoints, .. } => {
                Self::check_breakpoints(&self.name, breakpoints)?;
                HashMap::new()
            }
        };

        let producible = self.producible_codes();
        let codomain = match &self.codomain {
            Some(declared) => {
                if let Some(code) = producible.iter().find(|code| !declared.contains(code)) {
                    return Err(AppError::ConfigurationError(format!(
                        "field '{}' produces code {} outside its codomain {:?}",
                        self.name, code, declared
                    )));
                }
                declared.clone()
            }
            None => producible,
        };

        if codomain.is_empty() {
            return Err(AppError::ConfigurationError(format!(
                "field '{}' has an empty codomain",
                self.name
            )));
        }
        if codomain.contains(&UNMAPPED_CODE) {
            return Err(AppError::ConfigurationError(format!(
                "field '{}' uses the reserved unmapped code {}",
                self.name, UNMAPPED_CODE
            )));
        }

        Ok(FieldRule {
            spec: FieldSpec {
                codomain: Some(codomain.clone()),
                ..self
            },
            codomain,
            index,
        })
    }

    fn build_lookup_index(name: &str, entries: &[LookupEntry]) -> Result<HashMap<String, i64>> {
        if entries.is_empty() {
            return Err(AppError::ConfigurationError(format!(
                "lookup field '{}' has no entries",
                name
            )));
        }

        let mut index = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.label.trim().is_empty() {
                return Err(AppError::ConfigurationError(format!(
                    "lookup field '{}' has a blank label",
                    name
                )));
            }
            // Uploaded cells are trimmed, so a padded label could never match
            if entry.label.trim() != entry.label {
                return Err(AppError::ConfigurationError(format!(
                    "lookup field '{}' label '{}' has leading or trailing whitespace",
                    name, entry.label
                )));
            }
            if index.insert(entry.label.clone(), entry.code).is_some() {
                return Err(AppError::ConfigurationError(format!(
                    "lookup field '{}' maps label '{}' more than once",
                    name, entry.label
                )));
            }
        }
        Ok(index)
    }

    fn check_breakpoints(name: &str, breakpoints: &[Breakpoint]) -> Result<()> {
        let Some(first) = breakpoints.first() else {
            return Err(AppError::ConfigurationError(format!(
                "threshold field '{}' has no breakpoints",
                name
            )));
        };

        let upper = first.op.is_upper_bound();
        for breakpoint in breakpoints {
            if !breakpoint.cutoff.is_finite() {
                return Err(AppError::ConfigurationError(format!(
                    "threshold field '{}' has a non-finite cutoff",
                    name
                )));
            }
            if breakpoint.op.is_upper_bound() != upper {
                return Err(AppError::ConfigurationError(format!(
                    "threshold field '{}' mixes upper and lower bound breakpoints",
                    name
                )));
            }
        }

        for pair in breakpoints.windows(2) {
            let ordered = if upper {
                pair[0].cutoff < pair[1].cutoff
            } else {
                pair[0].cutoff > pair[1].cutoff
            };
            if !ordered {
                return Err(AppError::ConfigurationError(format!(
                    "threshold field '{}' breakpoints are not monotonic at {} {} then {} {}",
                    name,
                    pair[0].op.symbol(),
                    pair[0].cutoff,
                    pair[1].op.symbol(),
                    pair[1].cutoff
                )));
            }
        }
        Ok(())
    }
}

/// A validated [`FieldSpec`] ready to encode cells
#[derive(Debug, Clone, Serialize)]
pub struct FieldRule {
    #[serde(flatten)]
    spec: FieldSpec,

    #[serde(skip)]
    codomain: BTreeSet<i64>,

    #[serde(skip)]
    index: HashMap<String, i64>,
}

impl FieldRule {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn codomain(&self) -> &BTreeSet<i64> {
        &self.codomain
    }

    /// Code for one cell, or `None` when the value is not recognized
    pub fn apply(&self, value: &CellValue) -> Option<i64> {
        match &self.spec.kind {
            FieldKind::Lookup { .. } => {
                let label = value.label()?;
                self.index.get(label.as_ref()).copied()
            }
            FieldKind::Threshold {
                breakpoints,
                otherwise,
            } => {
                let number = value.as_number()?;
                let code = breakpoints
                    .iter()
                    .find(|breakpoint| breakpoint.op.matches(number, breakpoint.cutoff))
                    .map(|breakpoint| breakpoint.code)
                    .unwrap_or(*otherwise);
                Some(code)
            }
        }
    }
}
