//! Symbolic initial data for scalar wave simulations, and its translation into C.
//!
//! A code generation run owns a [`params::ParamRegistry`] and a [`grid::Grid`], which are
//! passed explicitly to every module that needs them. Modules register their parameters,
//! build expressions in terms of grid coordinates and C parameters, and hand the results
//! to [`codegen`] for emission.

pub mod codegen;
pub mod grid;
pub mod initial_data;
pub mod params;
pub mod refmetric;
pub mod symbolic;
pub mod table;

/// Provides common types used for most `sfcollapse` applications.
pub mod prelude {
    pub use crate::codegen::{CodegenOptions, Lhrh};
    pub use crate::grid::{Grid, GridFunctionKind};
    pub use crate::initial_data::{InitialDataSettings, ScalarInitialData};
    pub use crate::params::{ParamRegistry, ParamType, ParamValue};
    pub use crate::refmetric::CoordSystem;
    pub use crate::symbolic::{ccode, Expr, Symbol};
    pub use crate::table::{FsTables, Table, TableSource};
}
