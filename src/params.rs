//! Registry of named, typed parameters scoped by module.
//!
//! Parameters are addressed as `module::name`. Those declared as C parameters
//! stand for values which are only resolved at runtime of the generated code, and
//! appear in symbolic expressions as symbols carrying their name.

use crate::symbolic::Expr;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Type of a parameter, named as it appears in generated C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ParamType {
    #[serde(rename = "REAL")]
    Real,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "char")]
    Char,
}

impl ParamType {
    pub fn c_type(self) -> &'static str {
        match self {
            ParamType::Real => "REAL",
            ParamType::Int => "int",
            ParamType::Bool => "bool",
            ParamType::Char => "char",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_type())
    }
}

/// Value of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Real(f64),
    Int(i64),
    Bool(bool),
    Char(String),
}

impl ParamValue {
    pub fn ty(&self) -> ParamType {
        match self {
            ParamValue::Real(_) => ParamType::Real,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Char(_) => ParamType::Char,
        }
    }

    /// Parses a string as a value of the given type.
    pub fn parse(ty: ParamType, value: &str) -> Option<Self> {
        let value = value.trim();
        Some(match ty {
            ParamType::Real => ParamValue::Real(value.parse().ok()?),
            ParamType::Int => ParamValue::Int(value.parse().ok()?),
            ParamType::Bool => ParamValue::Bool(match value {
                "true" | "True" | "1" => true,
                "false" | "False" | "0" => false,
                _ => return None,
            }),
            ParamType::Char => ParamValue::Char(value.trim_matches('"').to_string()),
        })
    }

    /// Formats the value as a C literal.
    pub fn c_literal(&self) -> String {
        match self {
            ParamValue::Real(v) => format!("{v:?}"),
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Bool(v) => v.to_string(),
            ParamValue::Char(v) => format!("\"{v}\""),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Real(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Char(v) => f.write_str(v),
        }
    }
}

/// A single registered parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub module: String,
    pub name: String,
    pub value: ParamValue,
    /// Is this parameter exposed to generated C code?
    pub c_param: bool,
}

impl Param {
    pub fn key(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }

    pub fn ty(&self) -> ParamType {
        self.value.ty()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("parameter {key} already registered with type {existing}, cannot re-register as {requested}")]
    AlreadyRegistered {
        key: String,
        existing: ParamType,
        requested: ParamType,
    },
    #[error("parameter {0} is not registered")]
    NotFound(String),
    #[error("parameter name {0} is ambiguous, candidates: {1:?}")]
    Ambiguous(String, Vec<String>),
    #[error("parameter {key} has type {expected}, found value of type {found}")]
    TypeMismatch {
        key: String,
        expected: ParamType,
        found: ParamType,
    },
    #[error("failed to parse {value:?} as {ty} for parameter {key}")]
    InvalidValue {
        key: String,
        ty: ParamType,
        value: String,
    },
}

/// Collection of every parameter known to a code generation run, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct ParamRegistry {
    params: Vec<Param>,
    index: HashMap<String, usize>,
}

impl ParamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameter with a default value. Registering an existing parameter again with
    /// the same type does nothing and keeps the current value.
    pub fn initialize(
        &mut self,
        module: &str,
        name: &str,
        value: ParamValue,
    ) -> Result<(), ParamError> {
        self.register(module, name, value, false)
    }

    fn register(
        &mut self,
        module: &str,
        name: &str,
        value: ParamValue,
        c_param: bool,
    ) -> Result<(), ParamError> {
        let key = format!("{module}::{name}");

        if let Some(&idx) = self.index.get(&key) {
            let existing = &mut self.params[idx];
            if existing.ty() != value.ty() {
                return Err(ParamError::AlreadyRegistered {
                    key,
                    existing: existing.ty(),
                    requested: value.ty(),
                });
            }
            existing.c_param |= c_param;
            return Ok(());
        }

        log::trace!("Registering parameter {key} = {value}");

        self.index.insert(key, self.params.len());
        self.params.push(Param {
            module: module.to_string(),
            name: name.to_string(),
            value,
            c_param,
        });

        Ok(())
    }

    /// Declares a list of C parameters sharing a type and default, returning the symbol
    /// standing for each one.
    pub fn c_parameters(
        &mut self,
        module: &str,
        names: &[&str],
        default: ParamValue,
    ) -> Result<Vec<Expr>, ParamError> {
        names
            .iter()
            .map(|name| self.c_parameter(module, name, default.clone()))
            .collect()
    }

    /// Declares a single C parameter and returns its symbol.
    pub fn c_parameter(
        &mut self,
        module: &str,
        name: &str,
        default: ParamValue,
    ) -> Result<Expr, ParamError> {
        self.register(module, name, default, true)?;
        Ok(Expr::symbol(name))
    }

    fn position(&self, key: &str) -> Result<usize, ParamError> {
        if key.contains("::") {
            return self
                .index
                .get(key)
                .copied()
                .ok_or_else(|| ParamError::NotFound(key.to_string()));
        }

        // Bare names are accepted as long as they are unique across modules.
        let candidates: Vec<usize> = self
            .params
            .iter()
            .enumerate()
            .filter(|(_, param)| param.name == key)
            .map(|(idx, _)| idx)
            .collect();

        match candidates.as_slice() {
            [] => Err(ParamError::NotFound(key.to_string())),
            [idx] => Ok(*idx),
            _ => Err(ParamError::Ambiguous(
                key.to_string(),
                candidates.iter().map(|&i| self.params[i].key()).collect(),
            )),
        }
    }

    /// Finds a parameter by `module::name` or by a unique bare `name`.
    pub fn get(&self, key: &str) -> Result<&Param, ParamError> {
        Ok(&self.params[self.position(key)?])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_ok()
    }

    pub fn value(&self, key: &str) -> Result<&ParamValue, ParamError> {
        Ok(&self.get(key)?.value)
    }

    pub fn int(&self, key: &str) -> Result<i64, ParamError> {
        match self.value(key)? {
            ParamValue::Int(v) => Ok(*v),
            other => Err(self.mismatch(key, ParamType::Int, other.ty())),
        }
    }

    pub fn real(&self, key: &str) -> Result<f64, ParamError> {
        match self.value(key)? {
            ParamValue::Real(v) => Ok(*v),
            other => Err(self.mismatch(key, ParamType::Real, other.ty())),
        }
    }

    pub fn string(&self, key: &str) -> Result<&str, ParamError> {
        match self.value(key)? {
            ParamValue::Char(v) => Ok(v),
            other => Err(self.mismatch(key, ParamType::Char, other.ty())),
        }
    }

    fn mismatch(&self, key: &str, expected: ParamType, found: ParamType) -> ParamError {
        ParamError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        }
    }

    /// Overwrites the value of a registered parameter.
    pub fn set(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError> {
        let idx = self.position(key)?;
        let param = &mut self.params[idx];

        if param.ty() != value.ty() {
            return Err(ParamError::TypeMismatch {
                key: param.key(),
                expected: param.ty(),
                found: value.ty(),
            });
        }

        log::debug!("Setting {} = {}", param.key(), value);
        param.value = value;
        Ok(())
    }

    /// Parses `value` according to the parameter's type and stores it.
    pub fn set_from_str(&mut self, key: &str, value: &str) -> Result<(), ParamError> {
        let param = self.get(key)?;
        let ty = param.ty();
        let parsed = ParamValue::parse(ty, value).ok_or_else(|| ParamError::InvalidValue {
            key: param.key(),
            ty,
            value: value.to_string(),
        })?;
        self.set(key, parsed)
    }

    /// Iterates over all parameters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Iterates over the parameters visible to generated C code.
    pub fn c_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|param| param.c_param)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
