//! Parameter definitions passed on the command line, and `${key}` substitution in config strings.

use chumsky::{extra::Err, prelude::*};
use std::collections::HashMap;
use thiserror::Error;

/// Simple error used in chumsky parsers.
type SimpleError<'a> = Err<Simple<'a, char>>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DefParseError {
    #[error("expected definition of the form module::name=value, parsing failed with: {0}")]
    ParseFailed(String),
}

/// A parameter definition of the form `module::name=value` (or `name=value`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDef<'a> {
    /// Module owning the parameter, if qualified.
    pub module: Option<&'a str>,
    /// Name of the parameter within its module.
    pub name: &'a str,
    /// Unparsed value, interpreted according to the parameter's type.
    pub value: &'a str,
}

impl<'a> ParamDef<'a> {
    pub fn parse(source: &'a str) -> Result<Self, DefParseError> {
        param_def_parser()
            .parse(source)
            .into_result()
            .map_err(|errs| {
                DefParseError::ParseFailed(
                    errs.first()
                        .map(|err| err.to_string())
                        .unwrap_or_else(|| source.to_string()),
                )
            })
    }

    /// Key used to look the parameter up, `module::name` or just `name`.
    pub fn key(&self) -> String {
        match self.module {
            Some(module) => format!("{module}::{}", self.name),
            None => self.name.to_string(),
        }
    }
}

fn param_def_parser<'a>() -> impl Parser<'a, &'a str, ParamDef<'a>, SimpleError<'a>> {
    let ident = any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice();

    let key = ident
        .clone()
        .then(just("::").ignore_then(ident).or_not())
        .map(|(first, second)| match second {
            Some(name) => (Some(first), name),
            None => (None, first),
        });

    key.then_ignore(just('='))
        .then(any().repeated().at_least(1).to_slice())
        .map(|((module, name), value)| ParamDef {
            module,
            name,
            value,
        })
}

/// Values available for substitution, keyed by name.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct VarDefs {
    pub defs: HashMap<String, String>,
}

impl VarDefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.defs.insert(key.into(), value.into());
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransformError {
    #[error("key {0} is not defined")]
    KeyDoesNotExist(String),
    #[error("failed to parse template {0:?}")]
    TokenParseFailed(String),
}

/// Substitutes every `${key}` in a value with its definition. A literal `$` is written `$$`.
pub trait Transform {
    type Output;

    fn transform(&self, vars: &VarDefs) -> Result<Self::Output, TransformError>;
}

impl Transform for str {
    type Output = String;

    fn transform(&self, vars: &VarDefs) -> Result<String, TransformError> {
        if self.is_empty() {
            return Ok(String::new());
        }

        let tokens = token_stream_parser()
            .parse(self)
            .into_result()
            .map_err(|_| TransformError::TokenParseFailed(self.to_string()))?;

        let mut result = String::with_capacity(self.len());
        for token in tokens {
            match token {
                Token::Text(text) => result.push_str(text),
                Token::Dollar => result.push('$'),
                Token::Ref(key) => {
                    let value = vars
                        .defs
                        .get(key)
                        .ok_or_else(|| TransformError::KeyDoesNotExist(key.to_string()))?;
                    result.push_str(value);
                }
            }
        }

        Ok(result)
    }
}

impl Transform for String {
    type Output = String;

    fn transform(&self, vars: &VarDefs) -> Result<String, TransformError> {
        self.as_str().transform(vars)
    }
}

impl<T: Transform> Transform for Option<T> {
    type Output = Option<T::Output>;

    fn transform(&self, vars: &VarDefs) -> Result<Self::Output, TransformError> {
        self.as_ref().map(|value| value.transform(vars)).transpose()
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
enum Token<'src> {
    /// Run of characters without any `$`.
    Text(&'src str),
    /// Escaped `$$`.
    Dollar,
    /// Reference `${key}`.
    Ref(&'src str),
}

fn token_parser<'a>() -> impl Parser<'a, &'a str, Token<'a>, SimpleError<'a>> {
    let reference = just('$')
        .ignore_then(
            none_of('}')
                .repeated()
                .at_least(1)
                .to_slice()
                .delimited_by(just('{'), just('}')),
        )
        .map(Token::Ref);

    let dollar = just("$$").to(Token::Dollar);

    let text = none_of('$')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(Token::Text);

    choice((dollar, reference, text))
}

fn token_stream_parser<'a>() -> impl Parser<'a, &'a str, Vec<Token<'a>>, SimpleError<'a>> {
    token_parser().repeated().at_least(1).collect::<Vec<Token>>()
}
