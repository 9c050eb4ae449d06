//! Library half of the `termsync` binary.
//!
//! The binary parses arguments and installs logging; loading the model, the
//! store snapshot and the principal list, running the provisioner and writing
//! results back all live here so they can be exercised without a process.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use termsync_engine::{ProvisionConfig, ProvisionReport, TaxonomyProvisioner, TokenRegistry};
use termsync_model::TaxonomyModel;
use termsync_store::{MemoryDirectory, MemoryTermStore, OpenDirectory, PrincipalDirectory};
use termsync_types::Lcid;
use tracing::{debug, info, warn};

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub model: PathBuf,
    pub store: PathBuf,
    /// Known principals; `None` accepts every principal.
    pub principals: Option<PathBuf>,
    pub parameters: Vec<(String, String)>,
    /// Default language of a store created from scratch.
    pub language: Lcid,
    pub overwrite: bool,
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(model: impl Into<PathBuf>, store: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            store: store.into(),
            principals: None,
            parameters: Vec::new(),
            language: Lcid::EN_US,
            overwrite: false,
            dry_run: false,
        }
    }

    fn config(&self) -> ProvisionConfig {
        if self.overwrite {
            ProvisionConfig::overwrite()
        } else {
            ProvisionConfig::default()
        }
    }
}

/// Parses a `KEY=VALUE` token parameter. The value may itself contain `=`.
pub fn parse_parameter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn load_model(path: &Path) -> Result<TaxonomyModel> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model {}", path.display()))?;
    TaxonomyModel::from_json(&json)
        .with_context(|| format!("Failed to parse model {}", path.display()))
}

pub fn save_model(path: &Path, model: &TaxonomyModel) -> Result<()> {
    let json = model.to_json().context("Failed to serialize model")?;
    fs::write(path, json).with_context(|| format!("Failed to write model {}", path.display()))
}

/// Loads a store snapshot, or starts an empty store if the file is missing.
pub fn load_store(path: &Path, language: Lcid) -> Result<MemoryTermStore> {
    if !path.exists() {
        info!("No store at {}, starting empty (language {})", path.display(), language);
        return Ok(MemoryTermStore::new(language));
    }
    MemoryTermStore::load(path).with_context(|| format!("Failed to load store {}", path.display()))
}

/// Loads the principal list, a JSON array of names.
pub fn load_directory(path: Option<&Path>) -> Result<Box<dyn PrincipalDirectory>> {
    let Some(path) = path else {
        debug!("No principal list given, every principal is accepted");
        return Ok(Box::new(OpenDirectory));
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read principals {}", path.display()))?;
    let directory: MemoryDirectory = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse principals {}", path.display()))?;
    info!("Loaded {} principal(s) from {}", directory.len(), path.display());
    Ok(Box::new(directory))
}

/// Runs one reconciliation and writes the results back.
///
/// The store is saved even when provisioning fails part way, since every
/// batch committed before the failure has already been applied. The model,
/// carrying the resolved ids, is only saved after a successful run.
pub fn run(options: &RunOptions) -> Result<ProvisionReport> {
    let mut model = load_model(&options.model)?;
    let mut store = load_store(&options.store, options.language)?;
    let directory = load_directory(options.principals.as_deref())?;

    let mut tokens = TokenRegistry::new();
    for (key, value) in &options.parameters {
        tokens.add_parameter(key, value.clone());
    }

    let outcome = TaxonomyProvisioner::new(&mut store, &*directory, &mut tokens, options.config())
        .provision(&mut model);

    if options.dry_run {
        info!("Dry run, nothing written back");
        return outcome.context("Provisioning failed");
    }

    store
        .save(&options.store)
        .with_context(|| format!("Failed to save store {}", options.store.display()))?;
    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            warn!("Provisioning stopped part way, store saved with the batches already applied");
            return Err(e).context("Provisioning failed");
        }
    };
    save_model(&options.model, &model)?;
    info!(
        "Wrote {} and {}",
        options.store.display(),
        options.model.display()
    );
    Ok(report)
}

/// Human readable summary of a report.
pub fn summarize(report: &ProvisionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "groups: {} created, {} updated",
        report.groups_created, report.groups_updated
    );
    let _ = writeln!(
        out,
        "sets:   {} created, {} updated",
        report.sets_created, report.sets_updated
    );
    let _ = writeln!(
        out,
        "terms:  {} created, {} updated, {} reuse link(s)",
        report.terms_created, report.terms_updated, report.reuse_links_created
    );
    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    for outcome in &report.unresolved_reuse {
        let source = outcome
            .term_id
            .map_or_else(|| "no id".to_string(), |id| id.to_string());
        let _ = writeln!(
            out,
            "unresolved reuse: '{}' ({}) under {}",
            outcome.term_name, source, outcome.parent
        );
    }
    out
}
