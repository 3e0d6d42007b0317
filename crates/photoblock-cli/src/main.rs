use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use photoblock::{PhotoBlock, SensorModelError, SensorModelHandle, SensorModelProvider};
use serde_json::Value;

/// Load a photoblock JSON document (either dialect) and write it back in
/// canonical form.
#[derive(Debug, Parser)]
#[command(author, version, about = "Photoblock document round-trip tool")]
struct Args {
    /// Path to the input JSON file. A top-level `photoblock` member is used
    /// when present, otherwise the root object is taken as the block.
    #[arg(long)]
    input: String,

    /// Output path for the canonical JSON. Prints to stdout if omitted.
    #[arg(long)]
    output: Option<String>,
}

/// Pass-through sensor model: keeps the persisted state string verbatim and
/// reports no identifier of its own, so document round-trips preserve model
/// states without any sensor-model service on hand.
#[derive(Debug, Clone)]
struct OpaqueModel {
    state: String,
    identifier: String,
}

impl SensorModelHandle for OpaqueModel {
    fn state(&self) -> String {
        self.state.clone()
    }

    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn set_identifier(&mut self, identifier: &str) {
        self.identifier = identifier.to_owned();
    }

    fn clone_box(&self) -> Box<dyn SensorModelHandle> {
        Box::new(self.clone())
    }
}

struct OpaqueProvider;

impl SensorModelProvider for OpaqueProvider {
    fn create_from_state(
        &self,
        state: &str,
    ) -> Result<Box<dyn SensorModelHandle>, SensorModelError> {
        Ok(Box::new(OpaqueModel {
            state: state.to_owned(),
            identifier: photoblock::UNKNOWN_IDENTIFIER.to_owned(),
        }))
    }

    fn create_from_file(
        &self,
        filename: &Path,
        _model_name: Option<&str>,
        _entry_index: u32,
    ) -> Result<Box<dyn SensorModelHandle>, SensorModelError> {
        Err(SensorModelError::Unsupported {
            filename: filename.to_path_buf(),
        })
    }

    fn create_from_isd(
        &self,
        isd: &str,
        _model_name: Option<&str>,
    ) -> Result<Box<dyn SensorModelHandle>, SensorModelError> {
        self.create_from_state(isd)
    }

    fn list_supported_models(
        &self,
        _filename: &Path,
    ) -> Result<Vec<(String, String)>, SensorModelError> {
        Ok(Vec::new())
    }
}

fn regurgitate(input_path: &str) -> Result<String> {
    let data = fs::read_to_string(input_path)
        .with_context(|| format!("reading input file `{input_path}`"))?;
    let root: Value = serde_json::from_str(&data)
        .with_context(|| format!("parsing JSON from `{input_path}`"))?;

    let node = root.get("photoblock").unwrap_or(&root);
    let block = PhotoBlock::from_document(node, &OpaqueProvider)
        .context("loading photoblock document")?;

    Ok(serde_json::to_string_pretty(&block.to_document())?)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let json = regurgitate(&args.input)?;

    match &args.output {
        Some(path) => fs::write(path, json.as_bytes())
            .with_context(|| format!("writing output file `{path}`"))?,
        None => println!("{json}"),
    }
    Ok(())
}
