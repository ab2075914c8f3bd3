use cifar10_rust::cifar_dataset::{load, DatasetSplit, Labels};
use cifar10_rust::preprocess::ChannelStats;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sample counts and tensor shapes for each split
    Summary {
        #[arg(long)]
        data_dir: String,
        #[arg(long, default_value_t = 0.0)]
        valid_ratio: f32,
        #[arg(long)]
        shuffle: bool,
        /// Keep labels as integers instead of one-hot rows
        #[arg(long)]
        integer_labels: bool,
    },
    /// Measure per-channel mean/std of the training images
    Stats {
        #[arg(long)]
        data_dir: String,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            data_dir,
            valid_ratio,
            shuffle,
            integer_labels,
        } => {
            if let Err(e) = summary(&data_dir, valid_ratio, shuffle, !integer_labels) {
                eprintln!("Error loading dataset: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Stats { data_dir, json } => {
            if let Err(e) = stats(&data_dir, json) {
                eprintln!("Error measuring statistics: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn summary(
    data_dir: &str,
    valid_ratio: f32,
    shuffle: bool,
    one_hot: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (train_set, valid_set, test_set) = load::<f32>(data_dir, valid_ratio, one_hot, shuffle)?;
    print_split("train", &train_set);
    print_split("valid", &valid_set);
    print_split("test", &test_set);
    Ok(())
}

fn print_split(name: &str, split: &DatasetSplit<f32>) {
    let labels = match &split.labels {
        Labels::Integer(values) => format!("integer labels {:?}", values.shape()),
        Labels::OneHot(matrix) => format!("one-hot labels {:?}", matrix.shape()),
    };
    println!(
        "[{}] {} samples, data {:?}, {}",
        name.to_uppercase(),
        split.len(),
        split.data.shape(),
        labels
    );
}

fn stats(data_dir: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (train_set, _, _) = load::<f32>(data_dir, 0.0, false, false)?;
    let stats = ChannelStats::measure(&train_set.data);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "mean: [{:.1}, {:.1}, {:.1}]",
            stats.mean[0], stats.mean[1], stats.mean[2]
        );
        println!(
            "std:  [{:.1}, {:.1}, {:.1}]",
            stats.std[0], stats.std[1], stats.std[2]
        );
    }
    Ok(())
}
