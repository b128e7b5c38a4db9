use std::fs;
use std::path::{Path, PathBuf};

use burn::{
    optim::{adaptor::OptimizerAdaptor, Adam, Optimizer},
    record::{BinFileRecorder, FullPrecisionSettings, Record, Recorder, RecorderError},
    tensor::backend::AutodiffBackend,
};

use crate::network::{QNetwork, QNetworkRecord};

/// The optimizer as configured for the [`DQNAgent`](crate::agent::DQNAgent)
pub type AdamOptimizer<B> =
    OptimizerAdaptor<Adam<<B as AutodiffBackend>::InnerBackend>, QNetwork<B>, B>;

type AdamRecord<B> = <AdamOptimizer<B> as Optimizer<QNetwork<B>, B>>::Record;

/// Extension the file recorder appends to checkpoint paths
const FILE_EXT: &str = "bin";

/// Network weights and optimizer state, persisted as one atomic unit
#[derive(Record)]
pub struct Checkpoint<B: AutodiffBackend> {
    pub model: QNetworkRecord<B>,
    pub optim: AdamRecord<B>,
}

/// Write a checkpoint to `path`, creating parent directories as needed
///
/// Blocks until the file is fully written. Full precision is used so a
/// save/load round trip reproduces bit-identical forward passes.
pub fn save<B: AutodiffBackend>(
    checkpoint: Checkpoint<B>,
    path: &Path,
) -> Result<(), RecorderError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RecorderError::Unknown(e.to_string()))?;
    }
    BinFileRecorder::<FullPrecisionSettings>::new().record(checkpoint, path.to_path_buf())
}

/// Read a checkpoint from `path`
///
/// ### Returns
/// - `Ok(Some(checkpoint))` if the file exists and could be read
/// - `Ok(None)` if no checkpoint file exists yet, so training can start from
///   fresh weights
pub fn load<B: AutodiffBackend>(
    path: &Path,
    device: &B::Device,
) -> Result<Option<Checkpoint<B>>, RecorderError> {
    if !path.with_extension(FILE_EXT).is_file() {
        log::warn!(
            "file {} was not found when trying to load the model",
            path.display()
        );
        return Ok(None);
    }
    let checkpoint =
        BinFileRecorder::<FullPrecisionSettings>::new().load(path.to_path_buf(), device)?;
    Ok(Some(checkpoint))
}

/// Resolve the checkpoint path, honoring an explicit override name
///
/// An override (typically a process argument) maps to a file of that name
/// under the `lastModel` directory.
pub fn resolve_path(configured: &Path, override_name: Option<&str>) -> PathBuf {
    match override_name {
        Some(name) => Path::new("lastModel").join(name),
        None => configured.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};

    use super::*;

    type TestBackend = Autodiff<NdArray>;

    #[test]
    fn resolve_path_honors_override() {
        let configured = Path::new("lastModel/trained_model");
        assert_eq!(
            resolve_path(configured, None),
            PathBuf::from("lastModel/trained_model")
        );
        assert_eq!(
            resolve_path(configured, Some("other_model")),
            PathBuf::from("lastModel/other_model")
        );
    }

    #[test]
    fn load_missing_checkpoint_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("trained_model");
        let device = NdArrayDevice::default();

        let loaded = load::<TestBackend>(&missing, &device).unwrap();
        assert!(loaded.is_none(), "missing checkpoint recovers to a fresh start");
    }
}
