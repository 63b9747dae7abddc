//! Coordinates and grid functions of the numerical grid.

use crate::params::{ParamError, ParamRegistry, ParamValue};
use crate::symbolic::Expr;
use thiserror::Error;

/// Module name under which grid parameters are registered.
pub const MODULE: &str = "grid";
/// Key of the spatial dimension parameter.
pub const DIM: &str = "grid::DIM";

/// Largest supported number of spatial dimensions.
pub const MAX_DIM: usize = 3;

/// Storage class of a grid function, which decides the array it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GridFunctionKind {
    /// Evolved variable.
    #[serde(rename = "EVOL")]
    Evol,
    /// Auxiliary variable, recomputed from evolved variables.
    #[serde(rename = "AUX")]
    Aux,
    /// Auxiliary variable needed during the evolution step.
    #[serde(rename = "AUXEVOL")]
    AuxEvol,
}

impl GridFunctionKind {
    /// Name of the C array storing grid functions of this kind.
    pub fn array(self) -> &'static str {
        match self {
            GridFunctionKind::Evol => "in_gfs",
            GridFunctionKind::Aux => "aux_gfs",
            GridFunctionKind::AuxEvol => "auxevol_gfs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFunction {
    pub name: String,
    pub kind: GridFunctionKind,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("grid::DIM = {0} is outside the supported range 1..=3")]
    DimOutOfRange(i64),
    #[error("grid::DIM = {dim} exceeds the number of coordinates ({len})")]
    DimExceedsCoords { dim: usize, len: usize },
    #[error("grid function {0} is already registered")]
    DuplicateGridFunction(String),
    #[error("grid function {0} is not registered")]
    UnknownGridFunction(String),
}

/// The grid's coordinate symbols and registered grid functions.
#[derive(Debug, Clone)]
pub struct Grid {
    coords: Vec<Expr>,
    gridfunctions: Vec<GridFunction>,
}

impl Grid {
    /// Registers grid parameters and builds a grid with coordinates `xx0, xx1, xx2`.
    pub fn register(params: &mut ParamRegistry) -> Result<Self, ParamError> {
        params.initialize(MODULE, "DIM", ParamValue::Int(MAX_DIM as i64))?;
        Ok(Self::with_coords((0..MAX_DIM).map(|i| format!("xx{i}"))))
    }

    /// Builds a grid with the given coordinate names. Does not touch any parameters.
    pub fn with_coords(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            coords: names.into_iter().map(Expr::symbol).collect(),
            gridfunctions: Vec::new(),
        }
    }

    /// All coordinate symbols, regardless of the dimension.
    pub fn coords(&self) -> &[Expr] {
        &self.coords
    }

    /// Reads and validates `grid::DIM`.
    pub fn dim(&self, params: &ParamRegistry) -> Result<usize, GridError> {
        let dim = params.int(DIM)?;

        if dim < 1 || dim > MAX_DIM as i64 {
            return Err(GridError::DimOutOfRange(dim));
        }

        let dim = dim as usize;
        if dim > self.coords.len() {
            return Err(GridError::DimExceedsCoords {
                dim,
                len: self.coords.len(),
            });
        }

        Ok(dim)
    }

    /// Coordinates along the first `grid::DIM` axes.
    pub fn spatial_coords(&self, params: &ParamRegistry) -> Result<&[Expr], GridError> {
        let dim = self.dim(params)?;
        Ok(&self.coords[..dim])
    }

    /// Registers grid functions and returns the symbols standing for their values at a point.
    pub fn register_gridfunctions(
        &mut self,
        kind: GridFunctionKind,
        names: &[&str],
    ) -> Result<Vec<Expr>, GridError> {
        let mut result = Vec::with_capacity(names.len());

        for &name in names {
            if self.gridfunction(name).is_some() {
                return Err(GridError::DuplicateGridFunction(name.to_string()));
            }

            self.gridfunctions.push(GridFunction {
                name: name.to_string(),
                kind,
            });
            result.push(Expr::symbol(name));
        }

        Ok(result)
    }

    pub fn gridfunction(&self, name: &str) -> Option<&GridFunction> {
        self.gridfunctions.iter().find(|gf| gf.name == name)
    }

    pub fn gridfunctions(&self) -> &[GridFunction] {
        &self.gridfunctions
    }

    /// C expression accessing a grid function at the current point, i.e.
    /// `in_gfs[IDX4(UUGF, i0, i1, i2)]` in three dimensions.
    pub fn access(&self, params: &ParamRegistry, name: &str) -> Result<String, GridError> {
        let gf = self
            .gridfunction(name)
            .ok_or_else(|| GridError::UnknownGridFunction(name.to_string()))?;
        let dim = self.dim(params)?;

        let indices = (0..dim)
            .map(|i| format!("i{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "{}[IDX{}({}GF, {})]",
            gf.kind.array(),
            dim + 1,
            gf.name.to_uppercase(),
            indices
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_validation() {
        let mut params = ParamRegistry::new();
        let grid = Grid::register(&mut params).unwrap();
        assert_eq!(grid.dim(&params), Ok(3));
        assert_eq!(grid.spatial_coords(&params).unwrap().len(), 3);

        params.set(DIM, ParamValue::Int(1)).unwrap();
        assert_eq!(grid.spatial_coords(&params).unwrap(), &[Expr::symbol("xx0")]);

        params.set(DIM, ParamValue::Int(0)).unwrap();
        assert_eq!(grid.dim(&params), Err(GridError::DimOutOfRange(0)));

        params.set(DIM, ParamValue::Int(4)).unwrap();
        assert_eq!(grid.dim(&params), Err(GridError::DimOutOfRange(4)));
    }

    #[test]
    fn dimension_exceeds_coordinates() {
        let mut params = ParamRegistry::new();
        Grid::register(&mut params).unwrap();
        let grid = Grid::with_coords(["x", "y"]);

        assert_eq!(
            grid.dim(&params),
            Err(GridError::DimExceedsCoords { dim: 3, len: 2 })
        );
    }

    #[test]
    fn missing_dimension() {
        let params = ParamRegistry::new();
        let grid = Grid::with_coords(["x"]);
        assert!(matches!(
            grid.dim(&params),
            Err(GridError::Param(ParamError::NotFound(_)))
        ));
    }

    #[test]
    fn gridfunction_access() {
        let mut params = ParamRegistry::new();
        let mut grid = Grid::register(&mut params).unwrap();
        let gfs = grid
            .register_gridfunctions(GridFunctionKind::Evol, &["uu", "vv"])
            .unwrap();
        assert_eq!(gfs, vec![Expr::symbol("uu"), Expr::symbol("vv")]);

        assert_eq!(
            grid.access(&params, "uu").unwrap(),
            "in_gfs[IDX4(UUGF, i0, i1, i2)]"
        );

        params.set(DIM, ParamValue::Int(2)).unwrap();
        assert_eq!(
            grid.access(&params, "vv").unwrap(),
            "in_gfs[IDX3(VVGF, i0, i1)]"
        );

        assert_eq!(
            grid.register_gridfunctions(GridFunctionKind::Aux, &["uu"]),
            Err(GridError::DuplicateGridFunction("uu".to_string()))
        );
        assert_eq!(
            grid.access(&params, "ww"),
            Err(GridError::UnknownGridFunction("ww".to_string()))
        );
    }
}
