//! Binary snapshots of a single trained brain.
//!
//! A snapshot is the `bincode` encoding of a [`Brain`]: both weight matrices
//! with their shapes. There is no version header. A missing or unreadable
//! snapshot means "no trained AI available".

use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};

use super::brain::{ACTUATOR_COUNT, Brain, SENSOR_COUNT};
use super::error::{Error, Result};

impl Brain {
    /// Writes the brain to `path`, replacing any previous snapshot.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = bincode::serialize(self).map_err(|e| Error::CorruptData(e.to_string()))?;
        std::fs::write(path.as_ref(), bytes)?;
        info!(path = %path.as_ref().display(), "saved brain snapshot");
        Ok(())
    }

    /// Reads a brain back from `path`.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::MissingFile(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        decode(&bytes)
    }
}

/// Decodes a snapshot held in memory.
pub fn decode(bytes: &[u8]) -> Result<Brain> {
    let brain: Brain =
        bincode::deserialize(bytes).map_err(|e| Error::CorruptData(e.to_string()))?;
    if !brain.is_consistent() {
        return Err(Error::CorruptData(format!(
            "hidden layer mismatch: {} rows feed {} columns",
            brain.weights_ih.nrows(),
            brain.weights_ho.ncols()
        )));
    }
    Ok(brain)
}

/// Whether a snapshot file exists at `path`.
pub fn saved_brain_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// Loads a brain that can steer a bird, or `None` if there is none.
///
/// Missing files, undecodable bytes and networks with the wrong sensor or
/// actuator count are all logged and reported the same way.
pub fn load_saved_brain(path: impl AsRef<Path>) -> Option<Brain> {
    let path = path.as_ref();
    match Brain::load_from_file(path) {
        Ok(brain) if brain.inputs() == SENSOR_COUNT && brain.outputs() == ACTUATOR_COUNT => {
            Some(brain)
        }
        Ok(brain) => {
            warn!(
                path = %path.display(),
                inputs = brain.inputs(),
                outputs = brain.outputs(),
                "saved brain has the wrong topology"
            );
            None
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "no usable saved brain");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn decode_rejects_garbage() {
        let err = decode(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::CorruptData(_)));
    }

    #[test]
    fn decode_rejects_mismatched_layers() {
        let mut brain = Brain::new_bird(&mut StdRng::seed_from_u64(1));
        brain.weights_ho = ndarray::Array2::zeros((1, 3));
        let bytes = bincode::serialize(&brain).unwrap();
        assert!(matches!(decode(&bytes), Err(Error::CorruptData(_))));
    }

    #[test]
    fn encoding_is_bit_exact() {
        let brain = Brain::new_bird(&mut StdRng::seed_from_u64(2));
        let bytes = bincode::serialize(&brain).unwrap();
        let decoded = decode(&bytes).unwrap();
        for (a, b) in brain.to_flat_vector().iter().zip(decoded.to_flat_vector()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
