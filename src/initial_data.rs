//! Initial data for the scalar wave equation on a Cartesian grid.
//!
//! The field `uu` and its time derivative `vv` are set to the free C parameters
//! `uu_in` and `vv_in`, so their values are chosen at runtime of the generated code.
//! Alongside, the distance of each grid point from the scalar source position is
//! built symbolically.

use crate::grid::{Grid, GridError};
use crate::params::{ParamError, ParamRegistry, ParamValue};
use crate::symbolic::Expr;
use crate::table::{Table, TableError, TableSource};
use sfcollapse_app::float::arange;
use std::path::PathBuf;
use thiserror::Error;

/// Module owning the parameters declared here.
pub const MODULE: &str = "ID_array_scalar";

/// Names of the scalar source position parameters, one per axis.
pub const SCALAR_POSN: [&str; 3] = ["scalar_posn_x", "scalar_posn_y", "scalar_posn_z"];

#[derive(Error, Debug)]
pub enum InitialDataError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("invalid radial sampling, step must be finite and non-zero: {0:?}")]
    InvalidSampling(RadialSampling),
}

/// Symbols of the C parameters holding the initial field values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarParams {
    /// Initial value of the field.
    pub uu_in: Expr,
    /// Initial time derivative of the field.
    pub vv_in: Expr,
}

/// Declares `uu_in` and `vv_in`. Safe to call repeatedly.
pub fn declare_params(params: &mut ParamRegistry) -> Result<ScalarParams, ParamError> {
    let uu_in = params.c_parameter(MODULE, "uu_in", ParamValue::Real(0.0))?;
    let vv_in = params.c_parameter(MODULE, "vv_in", ParamValue::Real(0.0))?;
    Ok(ScalarParams { uu_in, vv_in })
}

/// Declares the source position parameters and returns their symbols.
pub fn declare_source_position(params: &mut ParamRegistry) -> Result<[Expr; 3], ParamError> {
    let [x, y, z] = SCALAR_POSN;
    Ok([
        params.c_parameter(MODULE, x, ParamValue::Real(0.0))?,
        params.c_parameter(MODULE, y, ParamValue::Real(0.0))?,
        params.c_parameter(MODULE, z, ParamValue::Real(0.0))?,
    ])
}

/// Radial sampling `arange(start, stop, step)` paired with the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RadialSampling {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for RadialSampling {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 1000.02,
            step: 0.01,
        }
    }
}

/// Location of the lookup table and its radial sampling.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InitialDataSettings {
    /// Path of the table, relative to the root of the table source.
    #[serde(default = "default_table")]
    pub path: PathBuf,
    #[serde(default)]
    pub sampling: RadialSampling,
}

impl Default for InitialDataSettings {
    fn default() -> Self {
        Self {
            path: default_table(),
            sampling: RadialSampling::default(),
        }
    }
}

fn default_table() -> PathBuf {
    PathBuf::from("InitialData/Pi001.csv")
}

/// Result of generating scalar wave initial data.
#[derive(Debug, Clone)]
pub struct ScalarInitialData {
    /// Initial value of the field, `uu_ID`.
    pub uu: Expr,
    /// Initial time derivative of the field, `vv_ID`.
    pub vv: Expr,
    /// Distance of a grid point from the scalar source position.
    pub radius: Expr,
    /// Symbols of the source position, one per axis.
    pub source_position: [Expr; 3],
    /// Lookup table of Pi values. Loaded, but not yet used by any generated expression.
    pub pi_table: Table,
    /// Radial sampling points matching `pi_table`. Not yet used either.
    pub radial_samples: Vec<f64>,
}

impl ScalarInitialData {
    /// Pairs of grid function name and the expression it is initialized with.
    pub fn gridfunction_values(&self) -> [(&'static str, Expr); 2] {
        [("uu", self.uu.clone()), ("vv", self.vv.clone())]
    }
}

/// Euclidean distance `sqrt(Σ (xx_i - posn_i)²)` over the paired axes.
pub fn radial_distance(coords: &[Expr], position: &[Expr]) -> Expr {
    let squares = coords
        .iter()
        .zip(position)
        .map(|(x, p)| Expr::pow(x - p, Expr::integer(2)));
    Expr::sqrt(Expr::add(squares))
}

/// Builds scalar wave initial data on `grid`, using parameters registered in `params`.
///
/// Fails if `grid::DIM` is missing, outside `1..=3` or larger than the number of grid
/// coordinates, and if the lookup table cannot be loaded from `tables`.
pub fn id_array_scalar(
    params: &mut ParamRegistry,
    grid: &Grid,
    tables: &impl TableSource,
    settings: &InitialDataSettings,
) -> Result<ScalarInitialData, InitialDataError> {
    let ScalarParams { uu_in, vv_in } = declare_params(params)?;

    let coords = grid.spatial_coords(params)?;
    let position = declare_source_position(params)?;

    let radius = radial_distance(coords, &position[..coords.len()]);

    log::debug!("Loading lookup table {}", settings.path.display());
    let pi_table = tables.load(&settings.path)?;

    let RadialSampling { start, stop, step } = settings.sampling;
    let radial_samples: Vec<f64> = arange(start, stop, step)
        .ok_or(InitialDataError::InvalidSampling(settings.sampling))?
        .collect();

    log::trace!(
        "Loaded {} table rows, {} radial samples, r = {}",
        pi_table.rows(),
        radial_samples.len(),
        radius
    );

    Ok(ScalarInitialData {
        uu: uu_in,
        vv: vv_in,
        radius,
        source_position: position,
        pi_table,
        radial_samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DIM;
    use crate::table::FsTables;
    use rand::Rng;
    use std::collections::HashMap;
    use std::path::Path;

    /// Serves tables from memory.
    struct MemoryTables(HashMap<PathBuf, String>);

    impl MemoryTables {
        fn with_default() -> Self {
            let mut tables = HashMap::new();
            tables.insert(default_table(), "0.0, 1.0\n0.01, 0.5\n".to_string());
            Self(tables)
        }
    }

    impl TableSource for MemoryTables {
        fn load(&self, path: &Path) -> Result<Table, TableError> {
            let source = self.0.get(path).ok_or_else(|| TableError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?;
            Table::parse(source)
        }
    }

    fn small_settings() -> InitialDataSettings {
        InitialDataSettings {
            sampling: RadialSampling {
                start: 0.0,
                stop: 1.0,
                step: 0.25,
            },
            ..Default::default()
        }
    }

    fn setup(dim: i64) -> (ParamRegistry, Grid) {
        let mut params = ParamRegistry::new();
        let grid = Grid::register(&mut params).unwrap();
        params.set(DIM, ParamValue::Int(dim)).unwrap();
        (params, grid)
    }

    #[test]
    fn field_values_are_free_parameters() {
        let (mut params, grid) = setup(3);
        let data =
            id_array_scalar(&mut params, &grid, &MemoryTables::with_default(), &small_settings())
                .unwrap();

        assert_eq!(data.uu, Expr::symbol("uu_in"));
        assert_eq!(data.vv, Expr::symbol("vv_in"));
        assert_eq!(data.pi_table.rows(), 2);
        assert_eq!(data.radial_samples, vec![0.0, 0.25, 0.5, 0.75]);

        let keys: Vec<String> = params.c_params().map(|p| p.key()).collect();
        assert_eq!(
            keys,
            vec![
                "ID_array_scalar::uu_in",
                "ID_array_scalar::vv_in",
                "ID_array_scalar::scalar_posn_x",
                "ID_array_scalar::scalar_posn_y",
                "ID_array_scalar::scalar_posn_z",
            ]
        );
    }

    #[test]
    fn radius_in_three_dimensions() {
        let (mut params, grid) = setup(3);
        let data =
            id_array_scalar(&mut params, &grid, &MemoryTables::with_default(), &small_settings())
                .unwrap();

        assert_eq!(
            data.radius.to_string(),
            "sqrt((-scalar_posn_x + xx0)**2 + (-scalar_posn_y + xx1)**2 + (-scalar_posn_z + xx2)**2)"
        );
    }

    /// The radius matches the euclidean norm over the first DIM axes at random points.
    #[test]
    fn radius_is_euclidean_norm() {
        let mut rng = rand::rng();

        for dim in 1..=3 {
            let (mut params, grid) = setup(dim);
            let data = id_array_scalar(
                &mut params,
                &grid,
                &MemoryTables::with_default(),
                &small_settings(),
            )
            .unwrap();

            for _ in 0..20 {
                let mut values = HashMap::new();
                let mut expected = 0.0;

                for axis in 0..3 {
                    let x: f64 = rng.random_range(-10.0..10.0);
                    let p: f64 = rng.random_range(-10.0..10.0);
                    values.insert(format!("xx{axis}"), x);
                    values.insert(SCALAR_POSN[axis].to_string(), p);
                    if axis < dim as usize {
                        expected += (x - p) * (x - p);
                    }
                }

                let radius = data.radius.eval(&values).unwrap();
                assert!((radius - f64::sqrt(expected)).abs() <= 1e-10);
            }

            let symbols = data.radius.free_symbols();
            assert_eq!(symbols.len(), 2 * dim as usize);
        }
    }

    #[test]
    fn repeated_calls_agree() {
        let (mut params, grid) = setup(2);
        let tables = MemoryTables::with_default();
        let first = id_array_scalar(&mut params, &grid, &tables, &small_settings()).unwrap();
        let second = id_array_scalar(&mut params, &grid, &tables, &small_settings()).unwrap();

        assert_eq!(first.uu, second.uu);
        assert_eq!(first.vv, second.vv);
        assert_eq!(first.radius, second.radius);
        assert_eq!(params.c_params().count(), 5);
    }

    #[test]
    fn missing_table_fails() {
        let (mut params, grid) = setup(3);
        let settings = InitialDataSettings {
            path: PathBuf::from("InitialData/missing.csv"),
            ..small_settings()
        };

        let result = id_array_scalar(&mut params, &grid, &MemoryTables::with_default(), &settings);
        assert!(matches!(
            result,
            Err(InitialDataError::Table(TableError::Io { .. }))
        ));
    }

    #[test]
    fn malformed_table_fails() {
        let (mut params, grid) = setup(3);
        let mut tables = MemoryTables::with_default();
        tables.0.insert(default_table(), "0.0, 1.0\n0.01, oops\n".to_string());

        let result = id_array_scalar(&mut params, &grid, &tables, &small_settings());
        assert!(matches!(
            result,
            Err(InitialDataError::Table(TableError::Parse { line: 2, .. }))
        ));
    }

    #[test]
    fn dimension_larger_than_coordinates_fails() {
        let mut params = ParamRegistry::new();
        Grid::register(&mut params).unwrap();
        let grid = Grid::with_coords(["xx0", "xx1"]);

        let result = id_array_scalar(
            &mut params,
            &grid,
            &MemoryTables::with_default(),
            &small_settings(),
        );
        assert!(matches!(
            result,
            Err(InitialDataError::Grid(GridError::DimExceedsCoords { dim: 3, len: 2 }))
        ));
    }

    #[test]
    fn unset_dimension_fails() {
        let mut params = ParamRegistry::new();
        let grid = Grid::with_coords(["xx0", "xx1", "xx2"]);

        let result = id_array_scalar(
            &mut params,
            &grid,
            &MemoryTables::with_default(),
            &small_settings(),
        );
        assert!(matches!(
            result,
            Err(InitialDataError::Grid(GridError::Param(ParamError::NotFound(_))))
        ));
    }

    #[test]
    fn zero_step_sampling_fails() {
        let (mut params, grid) = setup(3);
        let sampling = RadialSampling {
            start: 0.0,
            stop: 1.0,
            step: 0.0,
        };
        let settings = InitialDataSettings {
            sampling,
            ..small_settings()
        };

        let result = id_array_scalar(&mut params, &grid, &MemoryTables::with_default(), &settings);
        assert!(matches!(
            result,
            Err(InitialDataError::InvalidSampling(s)) if s == sampling
        ));
    }

    /// The table shipped with the repository loads with the default settings.
    #[test]
    fn shipped_table() {
        let (mut params, grid) = setup(3);
        let tables = FsTables::new(env!("CARGO_MANIFEST_DIR"));

        let data =
            id_array_scalar(&mut params, &grid, &tables, &InitialDataSettings::default()).unwrap();
        assert_eq!(data.pi_table.columns(), 2);
        assert_eq!(data.pi_table.rows(), 21);
        assert_eq!(data.pi_table.row(0), Some(&[0.0, 0.0][..]));
        assert_eq!(data.radial_samples[..2], [0.0, 0.01]);
        assert!(data.radial_samples.len() >= 100_002);
    }

    #[test]
    fn default_sampling() {
        let samples: Vec<f64> = {
            let RadialSampling { start, stop, step } = RadialSampling::default();
            arange(start, stop, step).unwrap().take(3).collect()
        };
        assert_eq!(samples, vec![0.0, 0.01, 0.02]);
        assert_eq!(default_table(), Path::new("InitialData/Pi001.csv"));
    }
}
