//! An executable generating C headers which set scalar wave initial data.

use clap::{arg, value_parser, ArgMatches, Command};
use console::style;
use eyre::{eyre, Context as _};
use sfcollapse::{
    codegen::{self, CodegenOptions, Lhrh},
    grid::{self, Grid, GridFunctionKind},
    initial_data::{self, ScalarInitialData},
    params::{ParamRegistry, ParamValue},
    refmetric,
    table::FsTables,
};
use sfcollapse_app::{
    config::{ParamDef, Transform as _, VarDefs},
    file::{abs_or_relative, export_toml, import_toml},
};
use std::path::{Path, PathBuf};

mod config;

use config::*;

fn main() -> eyre::Result<()> {
    // Set up nice colored error handing.
    color_eyre::install()?;

    let command = Command::new("idscalar")
        .about("Generates C code setting initial data for the scalar wave equation.")
        .author("Lukas Mesicek, lukas.m.mesicek@gmail.com")
        .version(clap::crate_version!())
        .config_args();
    let matches = command.get_matches();

    let config = load_config(&matches)?;

    env_logger::Builder::new()
        .filter_level(config.logging.filter())
        .init();

    // Register every parameter before any override is applied.
    let mut params = ParamRegistry::new();
    let mut grid = Grid::register(&mut params)?;
    refmetric::register(&mut params)?;
    initial_data::declare_params(&mut params)?;
    initial_data::declare_source_position(&mut params)?;

    apply_config(&mut params, &config)?;

    for def in matches.get_many::<String>("define").into_iter().flatten() {
        let def = ParamDef::parse(def)?;
        params
            .set_from_str(&def.key(), def.value)
            .with_context(|| format!("failed to apply definition {}", def.key()))?;
    }

    // Config strings may refer to any registered parameter.
    let mut vars = VarDefs::new();
    for param in params.iter() {
        vars.insert(param.key(), param.value.to_string());
    }
    vars.insert("name", config.name.clone());
    let config = config.transform(&vars)?;

    let directory = match matches.get_one::<PathBuf>("output") {
        Some(output) => abs_or_relative(output)?,
        None => abs_or_relative(Path::new(&config.directory))?,
    };

    let dim = grid.dim(&params)?;

    grid.register_gridfunctions(GridFunctionKind::Evol, &["uu", "vv"])?;

    let tables = FsTables::new(std::env::current_dir().context("failed to find working directory")?);
    let data = initial_data::id_array_scalar(&mut params, &grid, &tables, &config.table)
        .context("failed to build scalar initial data")?;

    println!("Initial Data: {}", style(&config.name).green());
    println!("Output Directory: {}", style(directory.display()).green());
    println!(
        "Grid: {}D {}",
        dim,
        refmetric::coord_system(&params)?.name()
    );

    write_headers(&directory, &params, &grid, &data)?;
    export_toml(&directory.join("config.toml"), &config)?;

    println!("{}", style("Done").green());

    Ok(())
}

/// Loads the config file if one was given, otherwise falls back to defaults.
fn load_config(matches: &ArgMatches) -> eyre::Result<Config> {
    let Some(path) = matches.get_one::<PathBuf>("config") else {
        return Ok(Config::default());
    };

    let path = abs_or_relative(path)?;
    import_toml::<Config>(&path).context("failed to parse config file")
}

/// Copies values from the config into the registry, with the raw `params` table last.
fn apply_config(params: &mut ParamRegistry, config: &Config) -> eyre::Result<()> {
    let dim = i64::try_from(config.grid.dim).map_err(|_| eyre!("grid dimension is too large"))?;
    params.set(grid::DIM, ParamValue::Int(dim))?;
    params.set(
        refmetric::COORD_SYSTEM,
        ParamValue::Char(config.grid.coord_system.name().to_string()),
    )?;

    let module = initial_data::MODULE;
    for (name, value) in initial_data::SCALAR_POSN.iter().zip(config.source.position) {
        params.set(&format!("{module}::{name}"), ParamValue::Real(value))?;
    }
    params.set(&format!("{module}::uu_in"), ParamValue::Real(config.source.uu))?;
    params.set(&format!("{module}::vv_in"), ParamValue::Real(config.source.vv))?;

    for (key, value) in &config.params {
        params
            .set_from_str(key, value)
            .with_context(|| format!("failed to apply config parameter {key}"))?;
    }

    Ok(())
}

fn write_headers(
    directory: &Path,
    params: &ParamRegistry,
    grid: &Grid,
    data: &ScalarInitialData,
) -> eyre::Result<()> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create {}", directory.display()))?;

    let write = |file: &str, contents: String| -> eyre::Result<()> {
        let path = directory.join(file);
        log::info!("Writing {}", path.display());
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    };

    write(
        "ID_array_scalar.h",
        codegen::gridfunction_writes(params, grid, &data.gridfunction_values())?,
    )?;
    write(
        "scalar_r.h",
        codegen::output_c(
            &[Lhrh::new("r", data.radius.clone())],
            &CodegenOptions {
                braces: false,
                declare: Some("const REAL".to_string()),
                ..Default::default()
            },
        ),
    )?;
    write(
        "ds_dirn.h",
        codegen::output_c(&refmetric::ds_dirn(params, grid)?, &CodegenOptions::default()),
    )?;
    write(
        "declare_Cparameters_struct.h",
        codegen::declare_cparams_struct(params),
    )?;
    write(
        "set_Cparameters_default.h",
        codegen::set_cparams_default(params),
    )?;

    Ok(())
}

/// Extension trait for defining helper methods on `clap::Command`.
trait CommandExt {
    fn config_args(self) -> Self;
}

impl CommandExt for Command {
    fn config_args(self) -> Self {
        self.arg(
            arg!(-c --config <FILE> "Sets a custom config file")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(-D --define <DEF> "Overrides a parameter, as module::name=value")
                .required(false)
                .action(clap::ArgAction::Append),
        )
        .arg(
            arg!(-o --output <DIR> "Directory to write generated headers to")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
    }
}
