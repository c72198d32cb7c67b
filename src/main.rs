use clap::Parser;
use log::{error, info};

use dental2yolo::adapter::{DatasetAdapter, DatasetKind};
use dental2yolo::config::{Args, Command};
use dental2yolo::error::Result;
use dental2yolo::mask::MaskAdapter;
use dental2yolo::passthrough::YoloAdapter;
use dental2yolo::split::SplitRatios;
use dental2yolo::store::CombinedStore;
use dental2yolo::voc::VocCsvAdapter;
use dental2yolo::{consolidate, index, overlay, split, sync};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Ingest {
            kind,
            source,
            combined,
            dataset_name,
            class_id,
            target_class,
            target_class_id,
        } => {
            if !source.is_dir() {
                return Err(dental2yolo::Error::MissingInput(source));
            }

            let adapter: Box<dyn DatasetAdapter> = match kind {
                DatasetKind::Mask => Box::new(MaskAdapter { class_id }),
                DatasetKind::VocCsv => Box::new(VocCsvAdapter {
                    target_class,
                    class_id,
                }),
                DatasetKind::Yolo => Box::new(YoloAdapter { target_class_id }),
            };

            info!("Extracting '{}' from {}...", dataset_name, source.display());
            let mut extraction = adapter.extract(&source)?;

            let store = CombinedStore::create(&combined)?;
            extraction.stats.integrated =
                consolidate::integrate(&store, &dataset_name, &extraction.images)?;
            extraction.stats.log_summary(&dataset_name);
        }

        Command::ExportBoxes { combined, output } => {
            let store = CombinedStore::open(&combined)?;
            let rows = index::rebuild(&store)?;
            let output = output.unwrap_or_else(|| store.index_path());
            index::write_csv(&output, &rows)?;
            info!(
                "Exported {} bounding box rows to {}",
                rows.len(),
                output.display()
            );
        }

        Command::Clean {
            combined,
            min_area,
            prefix,
        } => {
            let store = CombinedStore::open(&combined)?;
            sync::synchronize(&store, min_area, prefix.as_deref())?;
        }

        Command::Split {
            combined,
            output,
            train_ratio,
            val_ratio,
            test_ratio,
            seed,
        } => {
            let store = CombinedStore::open(&combined)?;
            let ratios = SplitRatios {
                train: train_ratio,
                val: val_ratio,
                test: test_ratio,
            };
            split::split_dataset(&store, &output, ratios, seed)?;
        }

        Command::Draw { combined, output } => {
            let store = CombinedStore::open(&combined)?;
            let output = output.unwrap_or_else(|| combined.join("images_with_bboxes"));
            overlay::draw_boxes(&store.index_path(), store.images_dir(), &output)?;
        }
    }

    Ok(())
}
