use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use argh::FromArgs;
use facenroll::{
    Enrollment, FaceNet, EMBEDDINGS_FILE, LABELS_FILE, LIKENESS_THRESHOLD,
};
use log::info;

/// Facenroll CLI Tool
/// Build and check a FaceNet enrollment set.
#[derive(FromArgs, PartialEq, Debug)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum Command {
    Enroll(Enroll),
    Identify(Identify),
}

/// Embed every .jpg in a directory and write embeddings.txt and labels.txt
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "enroll")]
struct Enroll {
    /// path to the FaceNetV1 .pb model
    #[argh(option, default = "PathBuf::from(\"graph_facenetv1_tensorflow.pb\")")]
    model_path: PathBuf,
    /// directory with the images to enroll
    #[argh(option, default = "PathBuf::from(\"./images/\")")]
    images_dir: PathBuf,
    /// where embeddings.txt and labels.txt are written
    #[argh(option, default = "PathBuf::from(\".\")")]
    output_dir: PathBuf,
    /// name of the graph's input placeholder
    #[argh(option, default = "String::from(\"input\")")]
    input_layer: String,
    /// name of the graph's embedding output
    #[argh(option, default = "String::from(\"output\")")]
    output_layer: String,
}

/// Match pictures against an existing enrollment set
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "identify")]
struct Identify {
    /// path to the FaceNetV1 .pb model
    #[argh(option, default = "PathBuf::from(\"graph_facenetv1_tensorflow.pb\")")]
    model_path: PathBuf,
    /// path to the enrolled embeddings
    #[argh(option, default = "PathBuf::from(EMBEDDINGS_FILE)")]
    embeddings: PathBuf,
    /// path to the enrolled labels
    #[argh(option, default = "PathBuf::from(LABELS_FILE)")]
    labels: PathBuf,
    /// squared distance below which a face is accepted
    #[argh(option, default = "LIKENESS_THRESHOLD")]
    threshold: f32,
    /// the Picture paths
    #[argh(positional)]
    paths: Vec<PathBuf>,
}

fn ensure_model(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        bail!("Path to FaceNetV1 model does not exist");
    }
    Ok(())
}

fn ensure_images_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        bail!("Path to images folder does not exist");
    }
    Ok(())
}

fn enroll(args: Enroll) -> anyhow::Result<()> {
    ensure_model(&args.model_path)?;
    ensure_images_dir(&args.images_dir)?;
    info!(
        "Starting train mode using images from {}",
        args.images_dir.display()
    );
    let model = FaceNet::load(&args.model_path)
        .with_context(|| format!("loading {}", args.model_path.display()))?
        .set_input_layer(args.input_layer)
        .set_output_layer(args.output_layer);
    let enrollment = Enrollment::from_directory(&model, &args.images_dir)?;
    let output_dir = &args.output_dir;
    enrollment
        .write_to(output_dir)
        .with_context(|| format!("writing to {}", output_dir.display()))?;
    Ok(())
}

fn identify(args: Identify) -> anyhow::Result<()> {
    ensure_model(&args.model_path)?;
    let enrollment = Enrollment::load(&args.embeddings, &args.labels)
        .context("reading the enrollment set")?;
    info!("Loaded {} enrolled face(s)", enrollment.len());
    let model = FaceNet::load(&args.model_path)
        .with_context(|| format!("loading {}", args.model_path.display()))?;
    for path in args.paths {
        let img = image::open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        let probe = model.embed(&img)?;
        match enrollment.identify(&probe, args.threshold)? {
            Some(m) => println!("{}: Authorized: {}", path.display(), m.label),
            None => println!("{}: Unknown", path.display()),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Turn off tensorflow logging.
    std::env::set_var("TF_CPP_MIN_LOG_LEVEL", "3");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();
    let Cli { command } = argh::from_env();
    match command {
        Command::Enroll(args) => enroll(args),
        Command::Identify(args) => identify(args),
    }
}
