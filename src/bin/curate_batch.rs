//! curate_batch - label one zip of fire-camera frames into the smoke dataset
//!
//! Frames are ordered by the capture time in their filenames, renamed to
//! `<camera>__<time>`, filed as nonSmoke / motion / smoke by the two
//! thresholds, recorded, and confirmed-smoke frames are cropped at most once
//! per crop interval.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use smoke_curator::{
    minutes_to_duration, plan, sequence, Collaborators, CurateConfig, ExtractedArchive,
    FilenamePolicy, FixedRegionCropper, FsRenamer, IngestionPipeline, LocalDestinationTree,
    RunSettings, RunSummary, SqliteRecordKeeper, Thresholds,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Zip file containing the images.
    #[arg(short = 'z', long)]
    zip_file: PathBuf,
    /// ID of the fire in the images.
    #[arg(short, long)]
    fire: String,
    /// ID of the camera used in the images.
    #[arg(short, long)]
    camera: String,
    /// Epoch seconds of the first image with smoke.
    #[arg(short, long, allow_negative_numbers = true)]
    initial_time: i64,
    /// Epoch seconds of the first image with enough smoke for cropping.
    #[arg(short, long, allow_negative_numbers = true)]
    enough_time: i64,
    /// Minimum minutes between cropped frames (overrides config).
    #[arg(long)]
    crop_every_minutes: Option<u64>,
    /// Unparseable filenames: abort the run or skip the file (overrides config).
    #[arg(long, value_name = "abort|skip")]
    on_unrecognized: Option<String>,
    /// Print the phase and crop plan without renaming, uploading or recording.
    #[arg(long)]
    dry_run: bool,
    /// UI mode for stderr progress.
    #[arg(long, value_enum, default_value_t = ui::UiMode::Auto)]
    ui: ui::UiMode,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let ui = ui::Ui::new(
        args.ui,
        std::io::stderr().is_terminal(),
        !std::io::stdout().is_terminal(),
    );

    let mut cfg = CurateConfig::load()?;
    if let Some(minutes) = args.crop_every_minutes {
        if minutes == 0 {
            anyhow::bail!("--crop-every-minutes must be greater than zero");
        }
        cfg.crop.every = minutes_to_duration(minutes)
            .ok_or_else(|| anyhow::anyhow!("--crop-every-minutes {minutes} is out of range"))?;
    }
    if let Some(policy) = args.on_unrecognized.as_deref() {
        cfg.on_unrecognized = policy.parse::<FilenamePolicy>()?;
    }
    if args.enough_time < args.initial_time {
        log::warn!(
            "enough time {} precedes initial time {}; no frame will be labelled developing-smoke",
            args.enough_time,
            args.initial_time
        );
    }

    let archive = {
        let _stage = ui.stage("Extract archive");
        ExtractedArchive::open(&args.zip_file)?
    };
    let batch = {
        let _stage = ui.stage("Order frames");
        sequence(archive.filenames(), cfg.on_unrecognized)?
    };
    let thresholds = Thresholds::new(args.initial_time, args.enough_time);

    if args.dry_run {
        for planned in plan(&batch, thresholds, cfg.crop.every) {
            println!(
                "{}  {:<16}  {}  {}",
                planned.time.iso(),
                planned.phase,
                if planned.crop_due { "crop" } else { "    " },
                planned.name
            );
        }
        for name in batch.skipped() {
            println!("skipped  {}", name);
        }
        return Ok(());
    }

    let (mut uploader, mut records, mut cropper) = {
        let _stage = ui.stage("Open destinations");
        let uploader = LocalDestinationTree::open(cfg.destinations.clone())?;
        let records = SqliteRecordKeeper::open(&cfg.db_path)?;
        std::fs::create_dir_all(&cfg.crop.output_dir)
            .with_context(|| format!("create {}", cfg.crop.output_dir.display()))?;
        let cropper = FixedRegionCropper::new(cfg.crop.regions.clone())?;
        (uploader, records, cropper)
    };
    let mut renamer = FsRenamer;

    let settings = RunSettings {
        camera_id: args.camera,
        fire_id: args.fire,
        thresholds,
        crop_every: cfg.crop.every,
        crop_dir: cfg.crop.output_dir.clone(),
    };

    let summary = {
        let _stage = ui.stage("Curate frames");
        let progress = ui.frames(batch.len());
        let mut observer = |path: &std::path::Path, phase: smoke_curator::PhaseLabel| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.advance(format!("{phase} {name}"));
        };
        let collab = Collaborators {
            renamer: &mut renamer,
            uploader: &mut uploader,
            records: &mut records,
            cropper: &mut cropper,
        };
        IngestionPipeline::new(&settings, collab)
            .on_frame(&mut observer)
            .run(archive.dir(), &batch)?
    };

    print_summary(&args.zip_file, &summary);
    Ok(())
}

fn print_summary(zip_file: &std::path::Path, summary: &RunSummary) {
    println!("=== {} ===", zip_file.display());
    println!("Frames:           {}", summary.frames());
    println!("  before-smoke:     {}", summary.before_smoke);
    println!("  developing-smoke: {}", summary.developing_smoke);
    println!("  confirmed-smoke:  {}", summary.confirmed_smoke);
    println!("Sampled for crop: {}", summary.sampled);
    println!("Crops written:    {}", summary.crops);
    if !summary.skipped.is_empty() {
        println!("Skipped ({}):", summary.skipped.len());
        for name in &summary.skipped {
            println!("  {}", name);
        }
    }
}
