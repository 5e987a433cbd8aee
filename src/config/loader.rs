//! Parameter loader
//!
//! This module implements the parameter loading pipeline:
//! 1. File size check and read (UTF-8 BOM stripped)
//! 2. YAML parsing
//! 3. Unknown-key detection against the schema, with suggestions
//! 4. `save_dir` default injection from [`LoaderOptions::exp_dir`]
//! 5. Per-section deserialization to typed params
//! 6. Validation
//! 7. Freeze with `Arc`

use crate::config::validation::Validator;
use crate::error::ConfigError;

use mobile_seg_core::config::schema::{DataParams, EXP_DIR, ModuleParams, Params, TrainerParams};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source label used when no file is involved.
const MAPPING_SOURCE: &str = "<mapping>";

// ============================================================================
// Public API
// ============================================================================

/// Options for the parameter loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Directory used for `trainer_params.save_dir` when a file omits it.
    pub exp_dir: PathBuf,

    /// Maximum parameter file size in bytes.
    pub max_config_size: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            exp_dir: PathBuf::from(EXP_DIR),
            max_config_size: env_or("MOBILE_SEG_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a parameter file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated parameters.
    pub params: Arc<Params>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

impl LoadResult {
    /// Emits every warning as a `tracing` event.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!(
                location = warning.location.as_deref().unwrap_or("<unknown>"),
                "{}",
                warning.message
            );
        }
    }
}

/// Warning during parameter loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Parameter loader.
///
/// Handles the full pipeline from YAML file (or in-memory mapping) to frozen
/// [`Params`].
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a parameter file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist or exceeds the size limit
    /// - YAML parsing fails or the document is empty
    /// - A key is not part of the schema or a value has the wrong type
    /// - Validation fails
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        tracing::debug!(path = %path.display(), "reading parameter file");

        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.options.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {} bytes", self.options.max_config_size),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: e.to_string(),
            },
        })?;

        self.parse(&raw, path)
    }

    /// Loads parameters from YAML text.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus the file checks.
    pub fn load_from_str(&self, raw: &str) -> Result<LoadResult, ConfigError> {
        self.parse(raw, Path::new("<string>"))
    }

    /// Loads parameters from an already parsed nested mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a mapping, holds an unknown key
    /// or a mistyped value, or fails validation.
    pub fn load_from_value(&self, root: &Value) -> Result<LoadResult, ConfigError> {
        self.build(root, MAPPING_SOURCE)
    }

    fn parse(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let root: Value = serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

        if root.is_null() {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: "parameter file is empty".to_string(),
            });
        }

        self.build(&root, &path.display().to_string())
    }

    fn build(&self, root: &Value, source: &str) -> Result<LoadResult, ConfigError> {
        let root = root.as_mapping().ok_or_else(|| ConfigError::InvalidValue {
            field: "<root>".to_string(),
            value: describe(root),
            expected: "a mapping of parameter sections".to_string(),
        })?;
        check_keys(root, Params::FIELDS, None)?;

        let module = section(root, "module_params", ModuleParams::FIELDS)?;
        let trainer = section(root, "trainer_params", TrainerParams::FIELDS)?;
        let data = section(root, "data_params", DataParams::FIELDS)?;

        let mut trainer_params: TrainerParams = deserialize_section("trainer_params", &trainer)?;
        if !trainer.contains_key("save_dir") {
            trainer_params.save_dir.clone_from(&self.options.exp_dir);
        }

        let params = Params {
            module_params: deserialize_section("module_params", &module)?,
            trainer_params,
            data_params: deserialize_section("data_params", &data)?,
            note: deserialize_note(root)?,
        };

        let result = Validator::new().validate(&params);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: source.to_string(),
                errors: result.errors,
            });
        }

        let warnings = result
            .warnings
            .into_iter()
            .map(|issue| LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            })
            .collect();

        tracing::info!(source, do_cv = params.do_cv(), "parameters loaded");
        Ok(LoadResult {
            params: Arc::new(params),
            warnings,
        })
    }
}

/// Loads a parameter file with default options, logging any warnings.
///
/// # Errors
///
/// See [`ConfigLoader::load`].
pub fn load(path: impl AsRef<Path>) -> Result<Params, ConfigError> {
    let result = ConfigLoader::with_defaults().load(path.as_ref())?;
    result.log_warnings();
    Ok(Arc::unwrap_or_clone(result.params))
}

/// Builds parameters from a nested mapping with default options, logging
/// any warnings.
///
/// # Errors
///
/// See [`ConfigLoader::load_from_value`].
pub fn from_dict(mapping: &Value) -> Result<Params, ConfigError> {
    let result = ConfigLoader::with_defaults().load_from_value(mapping)?;
    result.log_warnings();
    Ok(Arc::unwrap_or_clone(result.params))
}

/// Suggests the closest candidate for a misspelled name.
///
/// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
#[must_use]
pub fn suggest(input: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (*c, strsim::damerau_levenshtein(input, c)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

// ============================================================================
// Sections
// ============================================================================

/// Rejects keys of `map` that are not in `fields`.
fn check_keys(map: &Mapping, fields: &[&str], section: Option<&str>) -> Result<(), ConfigError> {
    let qualify = |key: &str| section.map_or_else(|| key.to_string(), |s| format!("{s}.{key}"));

    for key in map.keys() {
        let Some(key) = key.as_str() else {
            return Err(ConfigError::InvalidValue {
                field: qualify(&describe(key)),
                value: describe(key),
                expected: "a string key".to_string(),
            });
        };
        if !fields.contains(&key) {
            return Err(ConfigError::UnknownField {
                path: qualify(key),
                suggestion: suggest(key, fields),
            });
        }
    }
    Ok(())
}

/// Returns the keys of section `name`, checked against `fields`.
///
/// A missing or `null` section yields an empty mapping (all defaults).
fn section(root: &Mapping, name: &str, fields: &[&str]) -> Result<Mapping, ConfigError> {
    let map = match root.get(name) {
        None | Some(Value::Null) => return Ok(Mapping::new()),
        Some(Value::Mapping(map)) => map,
        Some(other) => {
            return Err(ConfigError::InvalidValue {
                field: name.to_string(),
                value: describe(other),
                expected: "a mapping".to_string(),
            });
        }
    };
    check_keys(map, fields, Some(name))?;
    Ok(map.clone())
}

fn deserialize_section<T: DeserializeOwned>(name: &str, map: &Mapping) -> Result<T, ConfigError> {
    serde_yaml::from_value(Value::Mapping(map.clone()))
        .map_err(|e| locate_invalid_value::<T>(name, map, &e))
}

/// Finds the key responsible for a section-level deserialization failure.
///
/// Every field has a default, so a single-entry mapping deserializes
/// cleanly unless that entry's value is the problem.
fn locate_invalid_value<T: DeserializeOwned>(
    name: &str,
    map: &Mapping,
    err: &serde_yaml::Error,
) -> ConfigError {
    for (key, value) in map {
        let mut single = Mapping::new();
        single.insert(key.clone(), value.clone());
        if let Err(field_err) = serde_yaml::from_value::<T>(Value::Mapping(single)) {
            return ConfigError::InvalidValue {
                field: format!("{name}.{}", key.as_str().unwrap_or_default()),
                value: describe(value),
                expected: expectation(&field_err),
            };
        }
    }
    ConfigError::InvalidValue {
        field: name.to_string(),
        value: describe(&Value::Mapping(map.clone())),
        expected: expectation(err),
    }
}

fn deserialize_note(root: &Mapping) -> Result<String, ConfigError> {
    match root.get("note") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(note)) => Ok(note.clone()),
        Some(other) => Err(ConfigError::InvalidValue {
            field: "note".to_string(),
            value: describe(other),
            expected: "a string".to_string(),
        }),
    }
}

/// Extracts the "expected ..." part of a serde error message.
fn expectation(err: &serde_yaml::Error) -> String {
    let message = err.to_string();
    message
        .rsplit_once(", expected ")
        .map_or_else(|| message.clone(), |(_, expected)| expected.to_string())
}

/// Renders a YAML value on one line for error messages.
fn describe(value: &Value) -> String {
    serde_yaml::to_string(value).map_or_else(
        |_| format!("{value:?}"),
        |s| s.trim_end().replace('\n', " "),
    )
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn loader() -> ConfigLoader {
        ConfigLoader::with_defaults()
    }

    #[test]
    fn test_load_minimal_file() {
        let yaml = r#"
module_params: { lr: 0.0003, optim: radam }
trainer_params: { epochs: 100 }
data_params: { batch_size: 32, fold: 0, n_splits: 5 }
note: "baseline"
"#;
        let result = loader().load_from_str(yaml).unwrap();
        let p = &result.params;
        assert_eq!(p.note, "baseline");
        assert_eq!(p.t().epochs, 100);
        assert_eq!(p.d().n_splits, Some(5));
        assert_eq!(p.t().save_dir, PathBuf::from(EXP_DIR));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_omitted_sections_take_defaults() {
        let result = loader().load_from_str("note: only a note").unwrap();
        let expected = Params {
            note: "only a note".to_string(),
            ..Params::default()
        };
        assert_eq!(*result.params, expected);
    }

    #[test]
    fn test_null_section_takes_defaults() {
        let result = loader().load_from_str("module_params:\nnote: x").unwrap();
        assert_eq!(*result.params.m(), ModuleParams::default());
    }

    #[test]
    fn test_default_round_trip() {
        let original = Params::default();
        let value = original.dict_config().unwrap();
        let reloaded = from_dict(&value).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_pretty_round_trip() {
        let original = Params {
            module_params: ModuleParams {
                ema_decay: Some(0.999),
                ..ModuleParams::default()
            },
            trainer_params: TrainerParams {
                gpus: Some(vec![0, 1]),
                amp_level: Some("O1".to_string()),
                ..TrainerParams::default()
            },
            note: "two gpus".to_string(),
            ..Params::default()
        };
        let text = original.pretty().unwrap();
        let reloaded = loader().load_from_str(&text).unwrap();
        assert_eq!(*reloaded.params, original);
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let err = loader()
            .load_from_str("module_param: { lr: 0.1 }")
            .unwrap_err();
        match err {
            ConfigError::UnknownField { path, suggestion } => {
                assert_eq!(path, "module_param");
                assert_eq!(suggestion.as_deref(), Some("module_params"));
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_section_key_rejected_with_suggestion() {
        let err = loader()
            .load_from_str("module_params: { lrr: 0.1 }")
            .unwrap_err();
        match err {
            ConfigError::UnknownField { path, suggestion } => {
                assert_eq!(path, "module_params.lrr");
                assert_eq!(suggestion.as_deref(), Some("lr"));
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn test_non_string_section_key_rejected() {
        let err = loader().load_from_str("data_params: { 1: 2 }").unwrap_err();
        match err {
            ConfigError::InvalidValue {
                field,
                value,
                expected,
            } => {
                assert_eq!(field, "data_params.1");
                assert_eq!(value, "1");
                assert_eq!(expected, "a string key");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_non_string_top_level_key_rejected() {
        let err = loader().load_from_str("1: 2").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref expected, .. } if expected == "a string key"
        ));
    }

    #[test]
    fn test_fold_under_module_params_rejected() {
        let mut value = Params::default().dict_config().unwrap();
        value["module_params"]["fold"] = Value::from(2);
        let err = from_dict(&value).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownField { ref path, .. } if path == "module_params.fold"
        ));
    }

    #[test]
    fn test_type_error_names_field() {
        let err = loader()
            .load_from_str("data_params: { fold: 1, batch_size: many }")
            .unwrap_err();
        match err {
            ConfigError::InvalidValue {
                field,
                value,
                expected,
            } => {
                assert_eq!(field, "data_params.batch_size");
                assert_eq!(value, "many");
                assert_eq!(expected, "u32");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_unsigned_rejected() {
        let err = loader()
            .load_from_str("trainer_params: { epochs: -3 }")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "trainer_params.epochs"
        ));
    }

    #[test]
    fn test_section_must_be_mapping() {
        let err = loader().load_from_str("data_params: 5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "data_params"
        ));
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = loader().load_from_str("- a\n- b").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "<root>"
        ));
    }

    #[test]
    fn test_note_must_be_string() {
        let err = loader().load_from_str("note: [1, 2]").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "note"
        ));
    }

    #[test]
    fn test_empty_document_rejected() {
        let err = loader().load_from_str("").unwrap_err();
        match err {
            ConfigError::ParseError { message, .. } => assert!(message.contains("empty")),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = loader()
            .load_from_str("note: ok\nmodule_params: { lr: [\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { line: Some(_), .. }));
    }

    #[test]
    fn test_validation_error_fails_load() {
        let err = loader()
            .load_from_str("data_params: { fold: -1, n_splits: null }")
            .unwrap_err();
        match err {
            ConfigError::ValidationError { path, errors } => {
                assert_eq!(path, "<string>");
                assert!(errors.iter().any(|e| e.path == "data_params.n_splits"));
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_warnings_are_returned() {
        let result = loader()
            .load_from_str("module_params: { optim: radamm }")
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].location.as_deref(),
            Some("module_params.optim")
        );
    }

    #[test]
    fn test_exp_dir_injected_when_save_dir_missing() {
        let options = LoaderOptions {
            exp_dir: PathBuf::from("/data/exp"),
            ..LoaderOptions::default()
        };
        let loader = ConfigLoader::new(options);
        let injected = loader.load_from_str("note: x").unwrap();
        assert_eq!(injected.params.t().save_dir, PathBuf::from("/data/exp"));

        let partial = loader
            .load_from_str("trainer_params: { epochs: 3 }")
            .unwrap();
        assert_eq!(partial.params.t().save_dir, PathBuf::from("/data/exp"));
        assert_eq!(partial.params.t().epochs, 3);

        let explicit = loader
            .load_from_str("trainer_params: { save_dir: runs }")
            .unwrap();
        assert_eq!(explicit.params.t().save_dir, PathBuf::from("runs"));
    }

    #[test]
    fn test_load_file_with_bom() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("\u{feff}note: bom\n".as_bytes()).unwrap();
        let params = load(file.path()).unwrap();
        assert_eq!(params.note, "bom");
    }

    #[test]
    fn test_missing_file() {
        let err = load("/nonexistent/mobile_seg_params.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_file_size_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "note: \"{}\"", "x".repeat(64)).unwrap();
        let loader = ConfigLoader::new(LoaderOptions {
            max_config_size: 16,
            ..LoaderOptions::default()
        });
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "file_size"
        ));
    }

    #[test]
    fn test_parse_error_carries_file_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"note: [unclosed\n").unwrap();
        let err = ConfigLoader::with_defaults().load(file.path()).unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_suggest_close() {
        assert_eq!(
            suggest("batchsize", DataParams::FIELDS),
            Some("batch_size".to_string())
        );
    }

    #[test]
    fn test_suggest_far() {
        assert!(suggest("xyzabc123", DataParams::FIELDS).is_none());
    }
}
