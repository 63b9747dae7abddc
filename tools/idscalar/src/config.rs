use serde::{Deserialize, Serialize};
use sfcollapse::{initial_data::InitialDataSettings, refmetric::CoordSystem};
use sfcollapse_app::config::{Transform, TransformError, VarDefs};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration format for idscalar.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Name of the generated initial data.
    #[serde(default = "default_name")]
    pub name: String,
    /// Directory to store generated headers, may reference parameters as `${module::name}`.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Logging configuration.
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub grid: Grid,
    /// Default values of the scalar source parameters.
    #[serde(default)]
    pub source: Source,
    /// Lookup table loaded alongside the initial data.
    #[serde(default)]
    pub table: InitialDataSettings,
    /// Additional parameter overrides, keyed by `module::name`.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            directory: default_directory(),
            logging: Logging::default(),
            grid: Grid::default(),
            source: Source::default(),
            table: InitialDataSettings::default(),
            params: BTreeMap::new(),
        }
    }
}

impl Transform for Config {
    type Output = Config;

    fn transform(&self, vars: &VarDefs) -> Result<Config, TransformError> {
        let mut result = self.clone();
        result.name = self.name.transform(vars)?;
        result.directory = self.directory.transform(vars)?;
        if let Some(path) = self.table.path.to_str() {
            result.table.path = PathBuf::from(path.transform(vars)?);
        }
        Ok(result)
    }
}

/// Options describing the numerical grid.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Grid {
    /// Number of spatial dimensions.
    #[serde(default = "default_dim")]
    pub dim: usize,
    #[serde(default)]
    pub coord_system: CoordSystem,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            dim: default_dim(),
            coord_system: CoordSystem::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Source {
    /// Position of the scalar source.
    #[serde(default)]
    pub position: [f64; 3],
    /// Initial value of the field.
    #[serde(default)]
    pub uu: f64,
    /// Initial time derivative of the field.
    #[serde(default)]
    pub vv: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Logging {
    /// Verbosity of logging
    pub level: usize,
}

impl Logging {
    /// Converts a logging level to a `log::LevelFilter`.
    pub fn filter(&self) -> log::LevelFilter {
        match self.level {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Error,
            2 => log::LevelFilter::Warn,
            3 => log::LevelFilter::Info,
            4 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

impl Default for Logging {
    fn default() -> Logging {
        Logging { level: 2 }
    }
}

// *****************************
// Defaults for serialization

fn default_name() -> String {
    "scalar_wave".to_string()
}

fn default_directory() -> String {
    "output".to_string()
}

fn default_dim() -> usize {
    3
}
