use crate::{Embedding, Enrollment, Result};

/// Squared distance under which two faces are considered the same person.
pub const LIKENESS_THRESHOLD: f32 = 0.9;

/// The enrolled identity closest to a probe embedding.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    pub label: String,
    pub distance: f32,
}

impl Enrollment {
    /// Finds the enrolled face nearest to `probe` whose squared distance is
    /// strictly below `threshold`.
    pub fn identify(
        &self,
        probe: &Embedding,
        threshold: f32,
    ) -> Result<Option<Match>> {
        let mut best: Option<Match> = None;
        for (label, embedding) in self.iter() {
            let distance = embedding.squared_distance(probe)?;
            if distance >= threshold {
                continue;
            }
            if best.as_ref().map_or(true, |m| distance < m.distance) {
                best = Some(Match {
                    label: label.to_string(),
                    distance,
                });
            }
        }
        Ok(best)
    }
}
