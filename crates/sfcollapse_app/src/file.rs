use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse toml file {path}: {source}")]
    Deserialize {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize toml: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> FileError + '_ {
    move |source| FileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Returns the path if it is absolute, otherwise joins it onto the current working directory.
pub fn abs_or_relative(path: &Path) -> Result<PathBuf, FileError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().map_err(io_error(Path::new(".")))?;
    Ok(cwd.join(path))
}

/// Deserialize data from toml file.
pub fn import_toml<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    let string = std::fs::read_to_string(path).map_err(io_error(path))?;
    toml::from_str(&string).map_err(|source| FileError::Deserialize {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize data to toml file, creating parent directories as needed.
pub fn export_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), FileError> {
    let string = toml::to_string_pretty(value)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    std::fs::write(path, string).map_err(io_error(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Example {
        name: String,
        position: [f64; 3],
    }

    #[test]
    fn toml_files() {
        let dir = std::env::temp_dir().join(format!("sfcollapse-app-{}", std::process::id()));
        let path = dir.join("nested").join("example.toml");

        let value = Example {
            name: "pulse".to_string(),
            position: [0.0, 1.5, -2.0],
        };
        export_toml(&path, &value).unwrap();
        assert_eq!(import_toml::<Example>(&path).unwrap(), value);

        std::fs::write(&path, "name = 3").unwrap();
        assert!(matches!(
            import_toml::<Example>(&path),
            Err(FileError::Deserialize { .. })
        ));
        assert!(matches!(
            import_toml::<Example>(&dir.join("missing.toml")),
            Err(FileError::Io { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn relative_paths() {
        let absolute = abs_or_relative(Path::new("some/file.toml")).unwrap();
        assert!(absolute.is_absolute());
        assert!(absolute.ends_with("some/file.toml"));
    }
}
