//! Command-line interface for epubkeep.
//!
//! Provides commands for building an empty package skeleton, staging
//! files into a package, watching staged files for external edits, and
//! showing the resolved configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::{config, ResolvedConfig};
use crate::core::{InventoryManifest, PackageLayout, Registry};
use crate::domain::{Resource, ResourceKind};

/// epubkeep - EPUB package folder and resource registry
#[derive(Parser, Debug)]
#[command(name = "epubkeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the package skeleton in a directory and print its folder map
    Layout {
        /// Package root (created if missing)
        dir: PathBuf,
    },

    /// Copy files into a package and print where they landed
    Stage {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Package root (a temporary directory if not given)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Package version for the manifest ("2.0" or "3.0")
        #[arg(long, env = "EPUBKEEP_EPUB_VERSION")]
        epub_version: Option<String>,

        /// Also create the navigation file (toc.ncx)
        #[arg(long)]
        ncx: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stage files, then log external edits to them until Ctrl-C
    Watch {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Package root
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Layout { dir } => show_layout(dir).await,
            Commands::Stage {
                inputs,
                out,
                epub_version,
                ncx,
                json,
            } => stage(&inputs, out, epub_version, ncx, json).await,
            Commands::Watch { inputs, out } => watch(&inputs, out).await,
            Commands::Config => show_config().await,
        }
    }
}

/// One staged resource, as printed by `stage --json`
#[derive(Debug, Serialize)]
struct StagedResource {
    id: String,
    book_path: String,
    kind: ResourceKind,
    media_type: String,
    epub_version: String,
}

impl From<&Resource> for StagedResource {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id().to_string(),
            book_path: resource.book_path(),
            kind: resource.kind(),
            media_type: resource.media_type(),
            epub_version: resource.epub_version(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StageReport {
    root: PathBuf,
    resources: Vec<StagedResource>,
}

/// Build the skeleton under `dir` and print the key → LCP map
async fn show_layout(dir: PathBuf) -> Result<()> {
    let layout = PackageLayout::create(&dir)
        .with_context(|| format!("Failed to create package skeleton in {}", dir.display()))?;
    let container = layout
        .write_container_xml()
        .context("Failed to write container.xml")?;

    eprintln!("Package skeleton at {}", layout.root().display());
    eprintln!("Container: {}\n", container.display());

    println!("{:<8} {}", "KEY", "LONGEST COMMON PATH");
    println!("{}", "-".repeat(60));
    for (key, lcp) in layout.lcp_map() {
        println!("{:<8} {}", key, lcp);
    }

    Ok(())
}

/// Stage inputs into a (possibly temporary) package
async fn stage(
    patterns: &[String],
    out: Option<PathBuf>,
    epub_version: Option<String>,
    ncx: bool,
    json: bool,
) -> Result<()> {
    let inputs = expand_inputs(patterns)?;
    if inputs.is_empty() {
        anyhow::bail!("No input files matched");
    }

    let mut settings = config()?.clone();
    if let Some(version) = epub_version {
        settings = settings.with_epub_version(version);
    }

    let (registry, _manifest) = open_registry(out, &settings)?;
    let mut resources = add_concurrently(&registry, inputs).await?;

    if ncx {
        let version = registry
            .opf()
            .map(|opf| opf.epub_version())
            .unwrap_or_else(|| settings.epub_version.clone());
        resources.push(registry.add_navigation_resource(&version));
    }

    resources.sort_by_key(|r| r.book_path());

    if json {
        let report = StageReport {
            root: registry.main_folder().to_path_buf(),
            resources: resources.iter().map(|r| StagedResource::from(r.as_ref())).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:<45} {:<6} {}", "BOOK PATH", "KIND", "MEDIA TYPE");
    println!("{}", "-".repeat(80));
    for resource in &resources {
        println!(
            "{:<45} {:<6} {}",
            resource.book_path(),
            resource.kind(),
            resource.media_type()
        );
    }
    println!("\nStaged {} file(s) under {}", resources.len(), registry.main_folder().display());

    Ok(())
}

/// Stage inputs, watch everything watchable and log changes until Ctrl-C
async fn watch(patterns: &[String], out: PathBuf) -> Result<()> {
    let inputs = expand_inputs(patterns)?;
    if inputs.is_empty() {
        anyhow::bail!("No input files matched");
    }

    let settings = config()?.clone();
    let (registry, _manifest) = open_registry(Some(out), &settings)?;
    let resources = add_concurrently(&registry, inputs).await?;

    let mut watched = 0;
    for resource in &resources {
        if registry.watch_resource(resource)? {
            watched += 1;
        }
    }

    let events = registry.subscribe();
    let logger = std::thread::Builder::new()
        .name("epubkeep-events".to_string())
        .spawn(move || {
            for event in events.iter() {
                tracing::info!("{}: {}", event.change, event.resource.book_path());
            }
        })
        .context("Failed to start event logger")?;

    eprintln!(
        "Watching {} of {} file(s) under {} (Ctrl-C to stop)",
        watched,
        resources.len(),
        registry.main_folder().display()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    // Dropping the registry closes the event channel and ends the logger.
    drop(registry);
    if logger.join().is_err() {
        tracing::warn!("Event logger panicked");
    }

    Ok(())
}

/// Show the resolved configuration
async fn show_config() -> Result<()> {
    let config = config()?;

    println!("Config file:       {}", match &config.config_file {
        Some(path) => path.display().to_string(),
        None => "(none, using defaults)".to_string(),
    });
    println!("EPUB version:      {}", config.epub_version);
    println!("Debounce:          {} ms", config.watch.debounce_ms);
    println!("Reappear timeout:  {} ms", config.watch.reappear_timeout_ms);
    println!("Poll interval:     {} ms", config.watch.poll_interval_ms);

    if !config.media_types.is_empty() {
        println!("\nMedia type overrides:");
        let mut overrides: Vec<_> = config.media_types.iter().collect();
        overrides.sort();
        for (extension, media_type) in overrides {
            println!("  .{:<10} {}", extension, media_type);
        }
    }

    Ok(())
}

/// Open a registry under `out` (or a temporary root) with an in-memory manifest
fn open_registry(
    out: Option<PathBuf>,
    settings: &ResolvedConfig,
) -> Result<(Arc<Registry>, Arc<InventoryManifest>)> {
    let manifest = Arc::new(InventoryManifest::new());

    let registry = match out {
        Some(root) => Registry::open_in(&root, settings.registry_config(), manifest.clone())
            .with_context(|| format!("Failed to open package at {}", root.display()))?,
        None => Registry::open(settings.registry_config(), manifest.clone())
            .context("Failed to open temporary package")?,
    };

    Ok((registry, manifest))
}

/// Expand glob patterns into a list of existing files
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let entries =
            glob::glob(pattern).with_context(|| format!("Invalid input pattern: {}", pattern))?;

        let before = files.len();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping unreadable input: {}", e),
            }
        }

        if files.len() == before {
            tracing::warn!("No files match {}", pattern);
        }
    }

    Ok(files)
}

/// Add every input on its own blocking task and collect the results
async fn add_concurrently(
    registry: &Arc<Registry>,
    inputs: Vec<PathBuf>,
) -> Result<Vec<Arc<Resource>>> {
    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let registry = Arc::clone(registry);
            tokio::task::spawn_blocking(move || {
                registry
                    .add_content_file(&input, true, None)
                    .with_context(|| format!("Failed to add {}", input.display()))
            })
        })
        .collect();

    let mut resources = Vec::with_capacity(handles.len());
    for handle in handles {
        resources.push(handle.await.context("Staging task panicked")??);
    }

    Ok(resources)
}
