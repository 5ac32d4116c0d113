//! Translate command - print the units published for one descriptor.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;

use tycho_p2::publisher::{BundleDescription, FeatureDescriptor, Manifest, ProductDescriptor};
use tycho_p2::repository::MetadataRepository;
use tycho_p2::{
    BundleTranslator, FeatureTranslator, InstallableUnit, ProductTranslator, TranslationResult,
};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Manifest headers as a JSON object
    Bundle,
    Feature,
    Product,
}

#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// What the input describes
    #[arg(value_enum)]
    pub kind: DescriptorKind,

    /// Input file (JSON)
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Also publish the source companion of a bundle
    #[arg(long)]
    pub with_source: bool,

    /// Write a metadata repository listing instead of printing the units
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn execute(args: TranslateArgs) -> Result<i32> {
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let result = translate(args.kind, &content, args.with_source)
        .with_context(|| format!("Failed to translate {}", args.input.display()))?;
    let units: Vec<Arc<InstallableUnit>> = result.units().cloned().collect();
    log::info!("Translated {} into {} units", args.input.display(), units.len());

    match args.output {
        Some(output) => {
            let id = result.primary.id().to_string();
            MetadataRepository::from_units(id, units).save(&output)?;
            println!("Wrote {}", output.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&units)?),
    }
    Ok(0)
}

fn translate(kind: DescriptorKind, content: &str, with_source: bool) -> Result<TranslationResult> {
    let result = match kind {
        DescriptorKind::Bundle => {
            let headers: IndexMap<String, String> = serde_json::from_str(content)?;
            BundleTranslator::new()
                .with_source_companion(with_source)
                .translate(&BundleDescription::new(Manifest::new(headers)))?
        }
        DescriptorKind::Feature => {
            let feature: FeatureDescriptor = serde_json::from_str(content)?;
            FeatureTranslator::new().translate(&feature)?
        }
        DescriptorKind::Product => {
            let product: ProductDescriptor = serde_json::from_str(content)?;
            ProductTranslator::new().translate(&product)?
        }
    };
    Ok(result)
}
