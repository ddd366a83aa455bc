use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{GenericImageView, Pixel};
use log::info;

use crate::{Embedding, Error, FaceNet, Result};

/// Name of the file holding the serialized embeddings.
pub const EMBEDDINGS_FILE: &str = "embeddings.txt";
/// Name of the file holding the serialized labels.
pub const LABELS_FILE: &str = "labels.txt";

const ENTRY_SEPARATOR: char = ';';
const VALUE_SEPARATOR: char = ' ';

/// Lists the `.jpg` files directly under `dir`, sorted by file name.
pub fn list_images(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_jpg = entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.ends_with(".jpg"));
        if is_jpg && entry.file_type()?.is_file() {
            images.push(entry.path());
        }
    }
    if images.is_empty() {
        return Err(Error::NoImages(dir.to_path_buf()));
    }
    images.sort();
    Ok(images)
}

/// The label of an image: its file name up to the first `.`.
pub fn label_for(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Labelled embeddings, kept in enrollment order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enrollment {
    labels: Vec<String>,
    embeddings: Vec<Embedding>,
}

impl Enrollment {
    pub fn new() -> Self { Self::default() }

    /// Embeds every `.jpg` under `dir` with `model`.
    pub fn from_directory(
        model: &FaceNet,
        dir: impl AsRef<Path>,
    ) -> Result<Self> {
        let mut enrollment = Self::new();
        for path in list_images(dir)? {
            info!("Using image: {}", path.display());
            let img = image::open(&path)?;
            enrollment.enroll(label_for(&path), model, &img)?;
        }
        Ok(enrollment)
    }

    /// Embeds a single image under `label`.
    pub fn enroll<I>(
        &mut self,
        label: impl Into<String>,
        model: &FaceNet,
        img: &I,
    ) -> Result<()>
    where
        I: GenericImageView,
        I::Pixel: 'static,
        <I::Pixel as Pixel>::Subpixel: 'static,
    {
        let embedding = model.embed(img)?;
        self.push(label, embedding)
    }

    /// Adds an already computed embedding.
    pub fn push(
        &mut self,
        label: impl Into<String>,
        embedding: Embedding,
    ) -> Result<()> {
        let label = label.into();
        if label.contains(ENTRY_SEPARATOR) {
            return Err(Error::InvalidLabel(label));
        }
        if let Some(first) = self.embeddings.first() {
            if first.dimensions() != embedding.dimensions() {
                return Err(Error::Dimensions {
                    expected: first.dimensions(),
                    found: embedding.dimensions(),
                });
            }
        }
        self.labels.push(label);
        self.embeddings.push(embedding);
        Ok(())
    }

    pub fn len(&self) -> usize { self.labels.len() }

    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    pub fn labels(&self) -> &[String] { &self.labels }

    pub fn embeddings(&self) -> &[Embedding] { &self.embeddings }

    /// Iterate over `(label, embedding)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Embedding)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.embeddings.iter())
    }

    /// `embeddings.txt` contents: values joined by spaces, entries by `;`.
    pub fn render_embeddings(&self) -> String {
        self.embeddings
            .iter()
            .map(|e| {
                e.as_slice()
                    .iter()
                    .map(f32::to_string)
                    .collect::<Vec<_>>()
                    .join(&VALUE_SEPARATOR.to_string())
            })
            .collect::<Vec<_>>()
            .join(&ENTRY_SEPARATOR.to_string())
    }

    /// `labels.txt` contents: labels joined by `;`.
    pub fn render_labels(&self) -> String {
        self.labels.join(&ENTRY_SEPARATOR.to_string())
    }

    /// Writes `embeddings.txt` and `labels.txt` into `dir`.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::write(dir.join(EMBEDDINGS_FILE), self.render_embeddings())?;
        fs::write(dir.join(LABELS_FILE), self.render_labels())?;
        info!("Wrote {} embedding(s) to {}", self.len(), dir.display());
        Ok(())
    }

    /// Parses the contents of `embeddings.txt` and `labels.txt`.
    pub fn parse(embeddings: &str, labels: &str) -> Result<Self> {
        let embeddings = embeddings.trim_end();
        // Labels can end in spaces, so only the final newline goes.
        let labels =
            labels.trim_end_matches(|c: char| c == '\r' || c == '\n');
        let rows: Vec<&str> = if embeddings.is_empty() {
            Vec::new()
        } else {
            embeddings.split(ENTRY_SEPARATOR).collect()
        };
        // A single unnamed face renders as an empty labels file.
        let names: Vec<&str> = if labels.is_empty() && rows.is_empty() {
            Vec::new()
        } else {
            labels.split(ENTRY_SEPARATOR).collect()
        };
        if rows.len() != names.len() {
            return Err(Error::Mismatch {
                embeddings: rows.len(),
                labels: names.len(),
            });
        }

        let mut enrollment = Self::new();
        for (entry, (row, name)) in rows.iter().zip(names).enumerate() {
            let values = row
                .split_whitespace()
                .map(|v| {
                    v.parse::<f32>().map_err(|_| Error::Parse {
                        entry,
                        value: v.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            enrollment.push(name, Embedding::from(values))?;
        }
        Ok(enrollment)
    }

    /// Reads back a pair of files produced by [`Enrollment::write_to`].
    pub fn load(
        embeddings: impl AsRef<Path>,
        labels: impl AsRef<Path>,
    ) -> Result<Self> {
        let embeddings = fs::read_to_string(embeddings)?;
        let labels = fs::read_to_string(labels)?;
        Self::parse(&embeddings, &labels)
    }
}
