//! Parameter validation
//!
//! Semantic checks on a fully deserialized [`Params`]. Type-level problems
//! are already rejected by the loader; this module checks ranges and the
//! relationships between fields.
//!
//! Validation collects ALL issues (doesn't stop at first) so a broken file
//! can be fixed in one pass.

use crate::config::loader::suggest;
use crate::error::{Severity, ValidationIssue};

use mobile_seg_core::config::schema::{
    CV_FOLD, DataParams, MAX_SPLITS, ModuleParams, Params, TrainerParams,
};
use std::collections::HashSet;

/// Optimizer names understood by the training module.
pub const KNOWN_OPTIMIZERS: &[&str] = &["adam", "adamw", "radam", "sgd", "rmsprop"];

/// Mixed-precision level labels.
pub const AMP_LEVELS: &[&str] = &["O0", "O1", "O2", "O3"];

// ============================================================================
// Public API
// ============================================================================

/// Result of parameter validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parameter validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a parameter set and returns every issue found.
    pub fn validate(&mut self, params: &Params) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_trainer(params.t());
        self.validate_module(params.m());
        self.validate_data(params.d());

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_trainer(&mut self, t: &TrainerParams) {
        if t.epochs == 0 {
            self.add_error("trainer_params.epochs", "epochs must be at least 1");
        }

        if t.num_tpu_cores.is_some() && t.gpus.is_some() {
            self.add_error(
                "trainer_params",
                "num_tpu_cores and gpus are mutually exclusive",
            );
        }

        if t.num_tpu_cores == Some(0) {
            self.add_error(
                "trainer_params.num_tpu_cores",
                "num_tpu_cores must be at least 1 when set",
            );
        }

        if let Some(gpus) = &t.gpus {
            if gpus.is_empty() {
                self.add_warning(
                    "trainer_params.gpus",
                    "Empty gpus list; training will run on CPU",
                );
            }
            let mut seen = HashSet::new();
            for id in gpus {
                if !seen.insert(id) {
                    self.add_error(
                        "trainer_params.gpus",
                        format!("Duplicate GPU id {id}"),
                    );
                }
            }
        }

        if let Some(level) = &t.amp_level {
            if !AMP_LEVELS.contains(&level.as_str()) {
                self.add_warning(
                    "trainer_params.amp_level",
                    format!(
                        "Unrecognised amp_level '{level}', expected one of {}",
                        AMP_LEVELS.join(", ")
                    ),
                );
            }
        }

        if t.save_dir.as_os_str().is_empty() {
            self.add_error("trainer_params.save_dir", "save_dir must not be empty");
        }
    }

    fn validate_module(&mut self, m: &ModuleParams) {
        if !m.lr.is_finite() || m.lr <= 0.0 {
            self.add_error(
                "module_params.lr",
                format!("lr must be a positive finite number, got {}", m.lr),
            );
        }

        if !m.weight_decay.is_finite() || m.weight_decay < 0.0 {
            self.add_error(
                "module_params.weight_decay",
                format!(
                    "weight_decay must be a non-negative finite number, got {}",
                    m.weight_decay
                ),
            );
        }

        if !KNOWN_OPTIMIZERS.contains(&m.optim.as_str()) {
            let hint = suggest(&m.optim, KNOWN_OPTIMIZERS)
                .map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"));
            self.add_warning(
                "module_params.optim",
                format!("Unknown optimizer '{}'{hint}", m.optim),
            );
        }

        if let Some(decay) = m.ema_decay {
            if !(decay > 0.0 && decay < 1.0) {
                self.add_error(
                    "module_params.ema_decay",
                    format!("ema_decay must lie in (0, 1), got {decay}"),
                );
            }
        } else if m.ema_eval_freq != 1 {
            self.add_warning(
                "module_params.ema_eval_freq",
                "ema_eval_freq has no effect without ema_decay",
            );
        }

        if m.ema_eval_freq == 0 {
            self.add_error(
                "module_params.ema_eval_freq",
                "ema_eval_freq must be at least 1",
            );
        }

        for (path, rate) in [
            ("module_params.drop_rate", m.drop_rate),
            ("module_params.drop_path_rate", m.drop_path_rate),
        ] {
            if !(0.0..1.0).contains(&rate) {
                self.add_error(path, format!("rate must lie in [0, 1), got {rate}"));
            }
        }
    }

    fn validate_data(&mut self, d: &DataParams) {
        if d.batch_size == 0 {
            self.add_error("data_params.batch_size", "batch_size must be at least 1");
        }

        if d.img_size == 0 {
            self.add_error("data_params.img_size", "img_size must be at least 1");
        }

        if d.fold < CV_FOLD {
            self.add_error(
                "data_params.fold",
                format!(
                    "fold must be {CV_FOLD} (cross-validation) or a fold index, got {}",
                    d.fold
                ),
            );
        }

        match d.n_splits {
            Some(0) => {
                self.add_error("data_params.n_splits", "n_splits must be at least 1");
            }
            Some(n) if n > MAX_SPLITS => {
                self.add_error(
                    "data_params.n_splits",
                    format!("n_splits must be at most {MAX_SPLITS}, got {n}"),
                );
            }
            Some(n) => {
                if u32::try_from(d.fold).is_ok_and(|fold| fold >= n) {
                    self.add_error(
                        "data_params.fold",
                        format!("fold {} is out of range for {n} splits", d.fold),
                    );
                }
                if d.do_cv() && n == 1 {
                    self.add_warning(
                        "data_params.n_splits",
                        "Cross-validation with a single split runs only one fold",
                    );
                }
            }
            None => {
                if d.do_cv() {
                    self.add_error(
                        "data_params.n_splits",
                        format!("Cross-validation (fold = {CV_FOLD}) requires n_splits"),
                    );
                }
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }
}
