use std::{fs, path::Path};

use image::{GenericImageView, Pixel};
use log::debug;
use tensorflow::{
    Graph, ImportGraphDefOptions, Session, SessionOptions, SessionRunArgs,
    Tensor,
};

use crate::{preprocess, Error, Result, NETWORK_HEIGHT, NETWORK_WIDTH};

/// Placeholder some FaceNet exports keep around for batch norm.
const PHASE_TRAIN: &str = "phase_train";

/// A fixed-length vector describing the identity features of a face.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Embedding(Vec<f32>);

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self { Self(values) }
}

impl Embedding {
    /// How many values this embedding holds
    pub fn dimensions(&self) -> usize { self.0.len() }

    pub fn as_slice(&self) -> &[f32] { &self.0 }

    /// Squared Euclidean distance to `other`.
    pub fn squared_distance(&self, other: &Self) -> Result<f32> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::Dimensions {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        Ok(self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum())
    }
}

/// A frozen FaceNet graph ready to embed faces.
#[derive(Debug)]
pub struct FaceNet {
    graph: Graph,
    session: Session,
    input_layer: String,
    output_layer: String,
    width: u32,
    height: u32,
}

impl FaceNet {
    /// Loads a serialized `GraphDef` from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading frozen graph from {}", path.display());
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Imports a serialized `GraphDef` already in memory.
    pub fn from_bytes(model: &[u8]) -> Result<Self> {
        let mut graph = Graph::new();
        graph.import_graph_def(model, &ImportGraphDefOptions::new())?;
        let session = Session::new(&SessionOptions::new(), &graph)?;
        Ok(Self {
            graph,
            session,
            input_layer: String::from("input"),
            output_layer: String::from("output"),
            width: NETWORK_WIDTH,
            height: NETWORK_HEIGHT,
        })
    }

    /// Set the name of the input placeholder
    pub fn set_input_layer(mut self, name: impl Into<String>) -> Self {
        self.input_layer = name.into();
        self
    }

    /// Set the name of the embedding output
    pub fn set_output_layer(mut self, name: impl Into<String>) -> Self {
        self.output_layer = name.into();
        self
    }

    /// Set the size images get resized to before inference
    pub const fn set_input_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Runs one forward pass and returns the embedding of `img`.
    pub fn embed<I>(&self, img: &I) -> Result<Embedding>
    where
        I: GenericImageView,
        I::Pixel: 'static,
        <I::Pixel as Pixel>::Subpixel: 'static,
    {
        let whitened = preprocess(img, self.width, self.height);
        let dims = [1, u64::from(self.height), u64::from(self.width), 3];
        let input = Tensor::new(&dims).with_values(&whitened)?;
        let phase_train = Tensor::new(&[]).with_values(&[false])?;

        let mut args = SessionRunArgs::new();
        args.add_feed(
            &self.graph.operation_by_name_required(&self.input_layer)?,
            0,
            &input,
        );
        if let Some(op) = self
            .graph
            .operation_by_name(PHASE_TRAIN)
            .map_err(tensorflow::Status::from)?
        {
            debug!("Feeding {} = false", PHASE_TRAIN);
            args.add_feed(&op, 0, &phase_train);
        }
        let output = args.request_fetch(
            &self.graph.operation_by_name_required(&self.output_layer)?,
            0,
        );
        self.session.run(&mut args)?;
        let res: Tensor<f32> = args.fetch(output)?;
        debug!("Output tensor dims: {:?}", res.dims());

        // Row 0 of a [1, D] batch.
        let dimensions = res.dims().last().copied().unwrap_or(0) as usize;
        if dimensions == 0 || res.len() < dimensions {
            return Err(Error::EmptyOutput);
        }
        Ok(Embedding(res[..dimensions].to_vec()))
    }
}
