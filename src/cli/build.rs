//! Build command implementation.
//!
//! Ingests an archive directory on a simulated clock and writes the active
//! atlas level (both animation phases) plus its reverse lookup index.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;

use crate::archive::{Catalog, DirectoryArchive};
use crate::atlas::{AtlasStore, PHASES};
use crate::config::MosaicConfig;
use crate::error::{MosaicError, Result};
use crate::ingest::{
    prepare_catalog, BlockingRetriever, IngestionScheduler, Retriever, RunStats, ThreadedRetriever,
};
use crate::output::{display_path, plural, Printer};
use crate::render::write_png;
use crate::types::{Bucket, CatalogEntry};

/// Index file written next to the atlas surfaces.
pub const INDEX_FILE: &str = "atlas.json";

/// Build an atlas from an archive directory
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Archive directory holding index.jsonl or index.csv and *.bitsy.txt documents
    pub archive: PathBuf,

    /// Config file (default: ./mosaic.yaml if present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Output directory
    #[arg(long, short, default_value = "dist")]
    pub output: PathBuf,

    /// Scale factor for output (integer upscaling)
    #[arg(long, default_value = "1")]
    pub scale: u32,

    /// Number of atlas levels
    #[arg(long)]
    pub levels: Option<u32>,

    /// Keep catalog order
    #[arg(long)]
    pub no_shuffle: bool,

    /// Seed for the catalog shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Buckets to place (tiles, sprites, items)
    #[arg(long, value_delimiter = ',')]
    pub show: Vec<Bucket>,

    /// Only ingest documents by this author (repeatable)
    #[arg(long = "author")]
    pub authors: Vec<String>,

    /// Fetch documents on worker threads
    #[arg(long)]
    pub threaded: bool,
}

impl BuildArgs {
    /// Load the config file and apply flag overrides.
    pub fn resolve_config(&self) -> Result<MosaicConfig> {
        let mut config = match &self.config {
            Some(path) => MosaicConfig::load(path)?,
            None => MosaicConfig::load_or_default(Path::new("."))?,
        };

        if let Some(levels) = self.levels {
            config.levels = levels;
        }
        if self.no_shuffle {
            config.shuffle = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if !self.show.is_empty() {
            config.show = self.show.clone();
        }
        if !self.authors.is_empty() {
            config.authors = self.authors.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let config = args.resolve_config()?;

    let archive = DirectoryArchive::open(&args.archive)?;
    let catalog = archive.fetch_catalog()?;
    let availability = archive.fetch_availability()?;
    let listed = catalog.len();
    let catalog = prepare_catalog(catalog, availability.as_ref(), &config);

    printer.status(
        "Loading",
        &format!(
            "{} ({} of {} listed)",
            display_path(archive.root()),
            plural(catalog.len(), "document", "documents"),
            listed
        ),
    );

    let (atlas, stats) = if args.threaded {
        ingest(&config, ThreadedRetriever::new(archive), catalog)?
    } else {
        ingest(&config, BlockingRetriever::new(archive), catalog)?
    };

    printer.status(
        "Placed",
        &format!(
            "{} across {} ({}×{} cells)",
            plural(stats.placed, "object", "objects"),
            plural(atlas.levels().len(), "level", "levels"),
            atlas.active_level().size(),
            atlas.active_level().size()
        ),
    );

    write_outputs(&atlas, &args.output, args.scale, printer)?;

    printer.status(
        "Finished",
        &format!(
            "{} simulated in {} ticks",
            format_duration(stats.finished_at),
            stats.ticks
        ),
    );

    Ok(())
}

/// Smallest configured interval; one simulated tick.
fn clock_step(config: &MosaicConfig) -> Duration {
    config
        .retrieval_interval()
        .min(config.placement_interval())
        .min(config.animation_interval())
}

fn ingest<R: Retriever>(
    config: &MosaicConfig,
    retriever: R,
    catalog: Vec<CatalogEntry>,
) -> Result<(AtlasStore, RunStats)> {
    let mut scheduler = IngestionScheduler::new(config, retriever, catalog)?;
    let stats = scheduler.run_until_idle(Duration::ZERO, clock_step(config))?;
    Ok((scheduler.into_atlas(), stats))
}

/// Write `atlas-<phase>.png` for each phase and the lookup index.
pub fn write_outputs(atlas: &AtlasStore, output: &Path, scale: u32, printer: &Printer) -> Result<()> {
    fs::create_dir_all(output).map_err(|e| MosaicError::Io {
        path: output.to_path_buf(),
        message: format!("Failed to create output directory: {}", e),
    })?;

    let level = atlas.active_level();
    for phase in 0..PHASES {
        let path = output.join(format!("atlas-{}.png", phase));
        write_png(level.frame(phase), &path, scale)?;
        printer.info("Wrote", &printer.cyan(&display_path(&path)));
    }

    let index_path = output.join(INDEX_FILE);
    atlas.index().write(&index_path)?;
    printer.info("Wrote", &printer.cyan(&display_path(&index_path)));

    Ok(())
}

fn format_duration(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasIndex;
    use tempfile::TempDir;

    fn args(archive: &Path, output: &Path) -> BuildArgs {
        BuildArgs {
            archive: archive.to_path_buf(),
            config: None,
            output: output.to_path_buf(),
            scale: 1,
            levels: Some(4),
            no_shuffle: true,
            seed: None,
            show: vec![],
            authors: vec![],
            threaded: false,
        }
    }

    fn write_archive(root: &Path) {
        let frame = "11111111\n".repeat(8);
        fs::write(
            root.join("index.csv"),
            "\"AAA\",\"2020\",\"First\",\"ana\",\"\"\n\"BBB\",\"2020\",\"Gone\",\"bo\",\"\"\n",
        )
        .unwrap();
        fs::write(
            root.join("AAA.bitsy.txt"),
            format!("PAL 0\n0,0,0\n255,255,255\n255,0,0\n\nTIL a\n{}\nTIL b\n{}", frame, frame),
        )
        .unwrap();
    }

    #[test]
    fn test_build_writes_outputs() {
        let archive = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_archive(archive.path());

        run(args(archive.path(), output.path()), &Printer::plain()).unwrap();

        let phase0 = image::open(output.path().join("atlas-0.png")).unwrap().to_rgba8();
        assert_eq!(phase0.dimensions(), (16, 16));
        assert_eq!(phase0.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert!(output.path().join("atlas-1.png").exists());

        let index = AtlasIndex::load(&output.path().join(INDEX_FILE)).unwrap();
        assert_eq!(index.locate(0, 0).map(|e| e.title.as_str()), Some("First"));
    }

    #[test]
    fn test_flags_override_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("mosaic.yaml");
        fs::write(&config_path, "levels: 8\nshuffle: true\nauthors: [zed]").unwrap();

        let mut build = args(dir.path(), dir.path());
        build.config = Some(config_path);
        build.show = vec![Bucket::Item];
        build.authors = vec!["ana".to_string()];

        let config = build.resolve_config().unwrap();
        assert_eq!(config.levels, 4);
        assert!(!config.shuffle);
        assert_eq!(config.show, vec![Bucket::Item]);
        assert_eq!(config.authors, vec!["ana"]);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = TempDir::new().unwrap();
        let mut build = args(dir.path(), dir.path());
        build.levels = Some(0);
        build.config = Some(dir.path().join("mosaic.yaml"));
        fs::write(dir.path().join("mosaic.yaml"), "").unwrap();

        assert!(build.resolve_config().is_err());
    }

    #[test]
    fn test_clock_step_is_smallest_interval() {
        assert_eq!(clock_step(&MosaicConfig::default()), Duration::from_millis(20));
    }
}
