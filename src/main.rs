use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use log::{debug, info};
use std::path::PathBuf;
use video_duration_tag::error::Error;
use video_duration_tag::probe::Ffprobe;
use video_duration_tag::{RenameEvent, RenameOptions, tag_path};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// video file or directory to tag, default to the current directory
    path: Option<PathBuf>,

    /// process subdirectories recursively
    #[arg(short = 'R', long)]
    recursive: bool,

    /// only print what would be renamed
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// ffprobe executable used to read durations
    #[arg(long, env = "FFPROBE", default_value = "ffprobe")]
    ffprobe: String,
}

fn print_event(event: RenameEvent) {
    match event {
        RenameEvent::Renamed(plan) => {
            println!("Renamed: {} -> {}", plan.from.display(), plan.to.display())
        }
        RenameEvent::Planned(plan) => {
            println!(
                "Would rename: {} -> {}",
                plan.from.display(),
                plan.to.display()
            )
        }
        RenameEvent::Unchanged(path) => debug!("Unchanged: {}", path.display()),
        RenameEvent::Failed {
            path,
            error: Error::Rename { source, .. },
        } => println!("Error renaming {}: {}", path.display(), source),
        RenameEvent::Failed { error, .. } => println!("Warning: {}", error),
    }
}

fn main() -> Result<()> {
    _ = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            _ = e.print();
            std::process::exit(1);
        }
    };

    let options = RenameOptions {
        path: cli.path.unwrap_or_else(|| PathBuf::from(".")),
        recursive: cli.recursive,
        dry_run: cli.dry_run,
    };
    let probe = Ffprobe::with_program(&cli.ffprobe);

    debug!("Options: {:?}", options);
    debug!("ffprobe: {}", cli.ffprobe);

    let summary = tag_path(&options, &probe, &mut print_event)?;
    info!(
        "Done: {} renamed, {} unchanged, {} skipped, {} failed",
        summary.renamed, summary.unchanged, summary.skipped, summary.failed
    );
    Ok(())
}
