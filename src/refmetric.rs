//! Orthogonal reference metrics and proper distances along coordinate directions.

use crate::codegen::Lhrh;
use crate::grid::{Grid, GridError};
use crate::params::{ParamError, ParamRegistry, ParamValue};
use crate::symbolic::Expr;
use std::str::FromStr;
use thiserror::Error;

pub const MODULE: &str = "reference_metric";
pub const COORD_SYSTEM: &str = "reference_metric::CoordSystem";

/// Coordinate system of the numerical grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum CoordSystem {
    /// `(x, y, z)`
    #[default]
    Cartesian,
    /// `(r, θ, φ)`
    Spherical,
    /// `(ρ, φ, z)`
    Cylindrical,
}

impl CoordSystem {
    pub fn name(self) -> &'static str {
        match self {
            CoordSystem::Cartesian => "Cartesian",
            CoordSystem::Spherical => "Spherical",
            CoordSystem::Cylindrical => "Cylindrical",
        }
    }

    /// Scale factors `h_i` of the diagonal metric `ds² = Σ h_i² dxx_i²`.
    pub fn scale_factors(self, xx: &[Expr; 3]) -> [Expr; 3] {
        match self {
            CoordSystem::Cartesian => [Expr::one(), Expr::one(), Expr::one()],
            CoordSystem::Spherical => [
                Expr::one(),
                xx[0].clone(),
                xx[0].clone() * Expr::sin(xx[1].clone()),
            ],
            CoordSystem::Cylindrical => [Expr::one(), xx[0].clone(), Expr::one()],
        }
    }
}

impl FromStr for CoordSystem {
    type Err = RefMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Cartesian" => CoordSystem::Cartesian,
            "Spherical" => CoordSystem::Spherical,
            "Cylindrical" => CoordSystem::Cylindrical,
            _ => return Err(RefMetricError::UnknownCoordSystem(s.to_string())),
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefMetricError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("unknown coordinate system {0}")]
    UnknownCoordSystem(String),
    #[error("orthogonal reference metrics need 3 coordinates, grid has {0}")]
    TooFewCoords(usize),
}

/// Registers `reference_metric::CoordSystem`, defaulting to Cartesian.
pub fn register(params: &mut ParamRegistry) -> Result<(), ParamError> {
    params.initialize(
        MODULE,
        "CoordSystem",
        ParamValue::Char(CoordSystem::default().name().to_string()),
    )
}

/// Reads the coordinate system currently selected in the registry.
pub fn coord_system(params: &ParamRegistry) -> Result<CoordSystem, RefMetricError> {
    params.string(COORD_SYSTEM)?.parse()
}

/// Proper distance `ds_dirn{i} = h_i dxx{i}` spanned by one grid cell along each spatial
/// direction.
pub fn ds_dirn(params: &ParamRegistry, grid: &Grid) -> Result<Vec<Lhrh>, RefMetricError> {
    let system = coord_system(params)?;
    let dim = grid.dim(params)?;

    let coords = grid.coords();
    if coords.len() < 3 {
        return Err(RefMetricError::TooFewCoords(coords.len()));
    }
    let xx = [coords[0].clone(), coords[1].clone(), coords[2].clone()];

    let scale = system.scale_factors(&xx);

    Ok((0..dim)
        .map(|i| {
            Lhrh::new(
                format!("ds_dirn{i}"),
                Expr::symbol(format!("dxx{i}")) * scale[i].clone(),
            )
        })
        .collect())
}
