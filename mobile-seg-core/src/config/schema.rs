//! Hyperparameter schema types
//!
//! The four records below describe one training run. They are plain value
//! types: nothing in this crate mutates them after construction, and
//! "changing" a parameter set always builds a new one.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default experiment directory used for `trainer_params.save_dir`.
///
/// Loaders may substitute their own directory when a file omits `save_dir`.
pub const EXP_DIR: &str = "experiments";

/// `fold` value that requests a full cross-validation run.
pub const CV_FOLD: i32 = -1;

/// Largest accepted `n_splits`.
///
/// [`Params::copy_for_cv`] materialises one parameter set per split.
pub const MAX_SPLITS: u32 = 100;

// ============================================================================
// Trainer Parameters
// ============================================================================

/// Hardware and run-control settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerParams {
    /// Number of TPU cores to train on
    pub num_tpu_cores: Option<u32>,

    /// GPU device ids to train on
    pub gpus: Option<Vec<u32>>,

    /// Number of training epochs
    pub epochs: u32,

    /// Mixed-precision level label (e.g. "O1")
    pub amp_level: Option<String>,

    /// Checkpoint to resume training from
    pub resume_from_checkpoint: Option<PathBuf>,

    /// Output directory for checkpoints and logs
    pub save_dir: PathBuf,
}

impl TrainerParams {
    /// Accepted keys, in declaration order.
    pub const FIELDS: &'static [&'static str] = &[
        "num_tpu_cores",
        "gpus",
        "epochs",
        "amp_level",
        "resume_from_checkpoint",
        "save_dir",
    ];

    /// Whether mixed-precision (16-bit) training is enabled.
    #[must_use]
    pub const fn use_16bit(&self) -> bool {
        self.amp_level.is_some()
    }
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            num_tpu_cores: None,
            gpus: None,
            epochs: 100,
            amp_level: None,
            resume_from_checkpoint: None,
            save_dir: PathBuf::from(EXP_DIR),
        }
    }
}

// ============================================================================
// Module Parameters
// ============================================================================

/// Optimisation settings.
///
/// Float fields compare and hash by bit pattern, which keeps `Eq` and
/// `Hash` consistent with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleParams {
    /// Learning rate
    pub lr: f64,

    /// Weight decay
    pub weight_decay: f64,

    /// Optimizer name
    pub optim: String,

    /// Exponential-moving-average decay factor; EMA is off when unset
    pub ema_decay: Option<f64>,

    /// Evaluate the EMA weights every this many epochs
    pub ema_eval_freq: u32,

    /// Dropout rate
    pub drop_rate: f64,

    /// Drop-path (stochastic depth) rate
    pub drop_path_rate: f64,
}

impl ModuleParams {
    /// Accepted keys, in declaration order.
    pub const FIELDS: &'static [&'static str] = &[
        "lr",
        "weight_decay",
        "optim",
        "ema_decay",
        "ema_eval_freq",
        "drop_rate",
        "drop_path_rate",
    ];

    /// Whether an exponential moving average of the weights is kept.
    #[must_use]
    pub const fn use_ema(&self) -> bool {
        self.ema_decay.is_some()
    }

    #[allow(clippy::type_complexity)]
    fn bits(&self) -> (u64, u64, &str, Option<u64>, u32, u64, u64) {
        (
            self.lr.to_bits(),
            self.weight_decay.to_bits(),
            &self.optim,
            self.ema_decay.map(f64::to_bits),
            self.ema_eval_freq,
            self.drop_rate.to_bits(),
            self.drop_path_rate.to_bits(),
        )
    }
}

impl Default for ModuleParams {
    fn default() -> Self {
        Self {
            lr: 3e-4,
            weight_decay: 1e-4,
            optim: "radam".to_string(),
            ema_decay: None,
            ema_eval_freq: 1,
            drop_rate: 0.0,
            drop_path_rate: 0.0,
        }
    }
}

impl PartialEq for ModuleParams {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for ModuleParams {}

impl Hash for ModuleParams {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

// ============================================================================
// Data Parameters
// ============================================================================

/// Dataset settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataParams {
    /// Mini-batch size
    pub batch_size: u32,

    /// Held-out fold index, or [`CV_FOLD`] for a full cross-validation run
    pub fold: i32,

    /// Number of cross-validation splits
    pub n_splits: Option<u32>,

    /// Square input image size in pixels
    pub img_size: u32,

    /// Random seed for splitting and shuffling
    pub seed: u64,
}

impl DataParams {
    /// Accepted keys, in declaration order.
    pub const FIELDS: &'static [&'static str] =
        &["batch_size", "fold", "n_splits", "img_size", "seed"];

    /// Whether a full cross-validation run was requested.
    #[must_use]
    pub const fn do_cv(&self) -> bool {
        self.fold == CV_FOLD
    }
}

impl Default for DataParams {
    fn default() -> Self {
        Self {
            batch_size: 32,
            fold: 0,
            n_splits: Some(5),
            img_size: 224,
            seed: 0,
        }
    }
}

// ============================================================================
// Root Parameters
// ============================================================================

/// Complete parameter set for one training run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// Optimisation settings
    pub module_params: ModuleParams,

    /// Hardware and run-control settings
    pub trainer_params: TrainerParams,

    /// Dataset settings
    pub data_params: DataParams,

    /// Free-text note describing the run
    pub note: String,
}

impl Params {
    /// Accepted top-level keys, in declaration order.
    pub const FIELDS: &'static [&'static str] =
        &["module_params", "trainer_params", "data_params", "note"];

    /// Short alias for `module_params`.
    #[must_use]
    pub const fn m(&self) -> &ModuleParams {
        &self.module_params
    }

    /// Short alias for `trainer_params`.
    #[must_use]
    pub const fn t(&self) -> &TrainerParams {
        &self.trainer_params
    }

    /// Short alias for `data_params`.
    #[must_use]
    pub const fn d(&self) -> &DataParams {
        &self.data_params
    }

    /// Whether a full cross-validation run was requested.
    #[must_use]
    pub const fn do_cv(&self) -> bool {
        self.data_params.do_cv()
    }

    /// A copy of these parameters holding out `fold`.
    #[must_use]
    pub fn with_fold(&self, fold: i32) -> Self {
        Self {
            data_params: DataParams {
                fold,
                ..self.data_params
            },
            ..self.clone()
        }
    }

    /// Expands these parameters into one parameter set per fold.
    ///
    /// The `n`-th element is identical to `self` except that
    /// `data_params.fold == n`, for `n` in `0..n_splits`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSplits`] if `n_splits` is unset, and
    /// [`ConfigError::InvalidValue`] if it is zero or above [`MAX_SPLITS`].
    pub fn copy_for_cv(&self) -> Result<Vec<Self>, ConfigError> {
        let n_splits = self.data_params.n_splits.ok_or(ConfigError::MissingSplits)?;
        let invalid = |expected: &str| ConfigError::InvalidValue {
            field: "data_params.n_splits".to_string(),
            value: n_splits.to_string(),
            expected: expected.to_string(),
        };
        if n_splits == 0 {
            return Err(invalid("a positive number of splits"));
        }
        if n_splits > MAX_SPLITS {
            return Err(invalid(&format!("at most {MAX_SPLITS} splits")));
        }
        let folds = i32::try_from(n_splits).map_err(|_| invalid("a fold index"))?;

        Ok((0..folds).map(|fold| self.with_fold(fold)).collect())
    }

    /// Nested mapping of every field, suitable for reloading.
    ///
    /// Unset optional fields are present as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SerializeError`] if a path is not valid UTF-8.
    pub fn dict_config(&self) -> Result<serde_yaml::Value, ConfigError> {
        serde_yaml::to_value(self).map_err(|e| ConfigError::SerializeError {
            message: e.to_string(),
        })
    }

    /// Human-readable YAML rendering of every field, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SerializeError`] if a path is not valid UTF-8.
    pub fn pretty(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError {
            message: e.to_string(),
        })
    }
}
