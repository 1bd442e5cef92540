pub mod definitions;
pub mod field_spec;

use std::fs;
use std::path::{Path, PathBuf};

use crate::ir::SmcSpec;
use crate::{Error, Result};

/// Where and under which names the headers are written.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub out_dir: PathBuf,
    pub definitions_name: String,
    pub field_spec_name: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("include"),
            definitions_name: "arg_struct_def.h".to_string(),
            field_spec_name: "field_specification.h".to_string(),
        }
    }
}

/// Both rendered headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headers {
    pub definitions: String,
    pub field_spec: String,
}

/// Paths of the headers written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub definitions: PathBuf,
    pub field_spec: PathBuf,
}

/// Render both headers in memory.
pub fn render_headers(spec: &SmcSpec) -> Result<Headers> {
    Ok(Headers {
        definitions: definitions::render(spec)?,
        field_spec: field_spec::render(spec)?,
    })
}

/// Parse `smclist` and write both headers into `options.out_dir`.
///
/// Nothing is written unless the whole call list parses and both headers
/// render.
pub fn generate(smclist: &Path, options: &GenerateOptions) -> Result<GeneratedFiles> {
    let spec = crate::dsl::parse_file(smclist)?;
    let headers = render_headers(&spec)?;

    fs::create_dir_all(&options.out_dir).map_err(|source| Error::Io {
        path: options.out_dir.clone(),
        source,
    })?;

    let files = GeneratedFiles {
        definitions: options.out_dir.join(&options.definitions_name),
        field_spec: options.out_dir.join(&options.field_spec_name),
    };
    write(&files.definitions, &headers.definitions)?;
    write(&files.field_spec, &headers.field_spec)?;

    tracing::debug!(
        "wrote {} and {}",
        files.definitions.display(),
        files.field_spec.display()
    );
    Ok(files)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
