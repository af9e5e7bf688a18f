//! Reading step sequences from YAML or CSV files

use std::path::Path;
use thiserror::Error;

use crate::core::step::{link_sequence, validate_steps, ProcessStep, StepError};
use crate::yaml::{parse_yaml, YamlError};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("unsupported step file '{0}' (expected .yaml, .yml or .csv)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Steps(#[from] StepError),
}

/// Parse steps from YAML: either a bare list or a mapping with a `steps` key.
///
/// The shape is decided first so field errors keep their line and column.
pub fn parse_steps_yaml(content: &str, filename: &str) -> Result<Vec<ProcessStep>, InputError> {
    #[derive(serde::Deserialize)]
    struct Wrapped {
        steps: Vec<ProcessStep>,
    }

    let shape: serde_yml::Value = parse_yaml(content, filename)?;
    let steps = if matches!(shape, serde_yml::Value::Mapping(_)) {
        parse_yaml::<Wrapped>(content, filename)?.steps
    } else {
        parse_yaml::<Vec<ProcessStep>>(content, filename)?
    };
    Ok(steps)
}

/// Parse steps from CSV with a header row named after the step fields
pub fn parse_steps_csv<R: std::io::Read>(reader: R, filename: &str) -> Result<Vec<ProcessStep>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize()
        .collect::<Result<Vec<ProcessStep>, csv::Error>>()
        .map_err(|source| InputError::Csv {
            path: filename.to_string(),
            source,
        })
}

/// Load, validate and link a step sequence from a file
pub fn load_steps(path: &Path) -> Result<Vec<ProcessStep>, InputError> {
    let filename = path.display().to_string();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let mut steps = match ext.as_str() {
        "yaml" | "yml" => {
            let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
                path: filename.clone(),
                source,
            })?;
            parse_steps_yaml(&content, &filename)?
        }
        "csv" => {
            let file = std::fs::File::open(path).map_err(|source| InputError::Io {
                path: filename.clone(),
                source,
            })?;
            parse_steps_csv(file, &filename)?
        }
        _ => return Err(InputError::UnsupportedFormat(filename)),
    };

    validate_steps(&steps)?;
    link_sequence(&mut steps);
    tracing::debug!(path = %filename, steps = steps.len(), "loaded steps");
    Ok(steps)
}
