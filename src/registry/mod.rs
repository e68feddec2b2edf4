//! The variable and calculation-mode registry: symbolic names over tree
//! elements and the named input shapes built from them.

pub mod mode;
pub mod variable;

pub use mode::*;
pub use variable::*;

use crate::error::{AuthoringError, ConfigError, ConfigPartialFailure};
use crate::formula::FieldType;
use ahash::AHashSet;

/// Cap on how many variables the synthesized fallback mode pulls in.
pub const AUTO_MODE_VARIABLE_LIMIT: usize = 25;

/// The loaded registry. Variables and modes are fetched independently; either
/// side may be empty when its load failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    variables: Vec<Variable>,
    modes: Vec<CalculationMode>,
}

impl Registry {
    /// Assembles a registry. When no modes are configured but variables
    /// exist, a synthetic "Auto" mode is built from the first
    /// [`AUTO_MODE_VARIABLE_LIMIT`] variables so callers always have
    /// something to run.
    pub fn new(variables: Vec<Variable>, modes: Vec<CalculationMode>) -> Self {
        let modes = if modes.is_empty() && !variables.is_empty() {
            vec![auto_mode(&variables)]
        } else {
            modes
        };
        Self { variables, modes }
    }

    /// Assembles a registry from the two independent load results. A failed
    /// side is served empty and reported; only a caller seeing
    /// [`ConfigPartialFailure::is_total`] needs to treat the registry as
    /// unusable.
    ///
    /// The "Auto" fallback stands in for "no modes declared", not for "modes
    /// unavailable": a failed modes load leaves the mode list empty.
    pub fn from_loads(
        variables: Result<Vec<Variable>, ConfigError>,
        modes: Result<Vec<CalculationMode>, ConfigError>,
    ) -> (Self, Option<ConfigPartialFailure>) {
        let mut failure = ConfigPartialFailure::default();
        let variables = variables.unwrap_or_else(|e| {
            failure.variables_error = Some(e.to_string());
            Vec::new()
        });
        let modes_failed = modes.is_err();
        let modes = modes.unwrap_or_else(|e| {
            failure.modes_error = Some(e.to_string());
            Vec::new()
        });
        let registry = if modes_failed {
            Self { variables, modes }
        } else {
            Self::new(variables, modes)
        };
        let report = if failure.variables_error.is_some() || failure.modes_error.is_some() {
            Some(failure)
        } else {
            None
        };
        (registry, report)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn modes(&self) -> &[CalculationMode] {
        &self.modes
    }

    pub fn variable_by_key(&self, exposed_key: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.exposed_key == exposed_key)
    }

    pub fn variable_by_id(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }

    pub fn mode_by_code(&self, code: &str) -> Option<&CalculationMode> {
        self.modes.iter().find(|m| m.code == code)
    }

    pub fn mode_by_id(&self, id: &str) -> Option<&CalculationMode> {
        self.modes.iter().find(|m| m.id == id)
    }

    /// Exposed keys must be unique; a duplicate would make formula references
    /// ambiguous.
    pub fn validate(&self) -> Result<(), AuthoringError> {
        let mut seen = AHashSet::with_capacity(self.variables.len());
        for variable in &self.variables {
            if !seen.insert(variable.exposed_key.as_str()) {
                return Err(AuthoringError::DuplicateExposedKey(
                    variable.exposed_key.clone(),
                ));
            }
        }
        Ok(())
    }
}

fn auto_mode(variables: &[Variable]) -> CalculationMode {
    let fields = variables
        .iter()
        .take(AUTO_MODE_VARIABLE_LIMIT)
        .map(|v| {
            let field_type = match &v.display_format {
                DisplayFormat::Number | DisplayFormat::NumberUnit(_) => FieldType::Number,
                DisplayFormat::Text => FieldType::Text,
            };
            let mut field = ModeField::new(
                v.id.clone(),
                v.exposed_key.clone(),
                v.display_name.clone(),
                field_type,
            );
            if let DisplayFormat::NumberUnit(unit) = &v.display_format {
                field = field.with_unit(unit.clone());
            }
            field
        })
        .collect();
    CalculationMode {
        id: "auto".to_string(),
        code: "auto".to_string(),
        label: "Auto".to_string(),
        fields,
    }
}
