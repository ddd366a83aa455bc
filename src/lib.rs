#![deny(
    unsafe_code,
    missing_debug_implementations,
    missing_copy_implementations,
    elided_lifetimes_in_paths,
    rust_2018_idioms,
    clippy::fallible_impl_from,
    clippy::missing_const_for_fn
)]

//! Face enrollment on top of a frozen FaceNet graph.
//!
//! Every `.jpg` in a directory is resized, whitened and pushed through the
//! network once; the resulting embeddings and their labels are written to
//! `embeddings.txt` and `labels.txt` for a downstream matcher.
//!
//! ```no_run
//! use facenroll::{Enrollment, FaceNet};
//!
//! # fn main() -> facenroll::Result<()> {
//! let model = FaceNet::load("graph_facenetv1_tensorflow.pb")?;
//! let enrollment = Enrollment::from_directory(&model, "./images/")?;
//! enrollment.write_to(".")?;
//! # Ok(())
//! # }
//! ```

mod enrollment;
mod matcher;
mod model;
mod preprocess;

pub use enrollment::{
    label_for, list_images, Enrollment, EMBEDDINGS_FILE, LABELS_FILE,
};
pub use matcher::{Match, LIKENESS_THRESHOLD};
pub use model::{Embedding, FaceNet};
pub use preprocess::{preprocess, whiten, NETWORK_HEIGHT, NETWORK_WIDTH};

/// The Errors always happens :)
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Tensorflow Error: {0}")]
    TFError(#[from] tensorflow::Status),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
    #[error("No .jpg files found in {}", .0.display())]
    NoImages(std::path::PathBuf),
    #[error("The model produced an empty embedding")]
    EmptyOutput,
    #[error("Label {0:?} can not contain ';'")]
    InvalidLabel(String),
    #[error("Invalid embedding value {value:?} in entry {entry}")]
    Parse { entry: usize, value: String },
    #[error("Found {embeddings} embedding(s) but {labels} label(s)")]
    Mismatch { embeddings: usize, labels: usize },
    #[error("Expected {expected} dimensions, got {found}")]
    Dimensions { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
