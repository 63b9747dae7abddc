//! Common utilities used by sfcollapse applications.
//!
//! Includes parsing of `module::name=value` parameter definitions, `${key}`
//! substitution in config strings, loading and saving toml files, and numpy
//! style floating point ranges.

pub mod config;
pub mod file;
pub mod float;
