use crate::rebase::REF_PERIOD;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Rebasing configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Reference period whose mean is normalized to 1.0.
    pub ref_period: String,

    /// Header of the label column in series files.
    pub label_column: String,
    /// Header of the value column in series files.
    pub value_column: String,

    /// Base values with an absolute value not above this are degenerate.
    pub zero_tol: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ref_period: REF_PERIOD.to_string(),
            label_column: "date".to_string(),
            value_column: "cpi".to_string(),
            zero_tol: 0.0,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded; keys it omits take their default values.
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_label(&self.ref_period).context("invalid reference period")?;
        check_label(&self.label_column).context("invalid label column")?;
        check_label(&self.value_column).context("invalid value column")?;
        if self.label_column.eq_ignore_ascii_case(&self.value_column) {
            bail!("label and value columns must differ");
        }

        check_num(self.zero_tol, 0.0..1.0).context("invalid zero tolerance")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_label(label: &str) -> Result<()> {
    if label.is_empty() {
        bail!("label must not be empty");
    }
    if label.trim() != label {
        bail!("label must not have surrounding whitespace, but is {label:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.ref_period, "2009");
    }

    #[test]
    fn parses_all_keys() {
        let cfg = Config::from_toml(
            r#"
ref_period = "2015"
label_column = "DATE"
value_column = "CPIAUCSL"
zero_tol = 1e-9
"#,
        )
        .unwrap();
        assert_eq!(cfg.ref_period, "2015");
        assert_eq!(cfg.label_column, "DATE");
        assert_eq!(cfg.value_column, "CPIAUCSL");
        assert_eq!(cfg.zero_tol, 1e-9);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Config::from_toml("ref_period = \"\"").is_err());
        assert!(Config::from_toml("ref_period = \" 2009\"").is_err());
        assert!(Config::from_toml("zero_tol = -1.0").is_err());
        assert!(Config::from_toml("zero_tol = 1.0").is_err());
        assert!(Config::from_toml("label_column = \"cpi\"").is_err());
        assert!(Config::from_toml("n_env = 2").is_err());
        assert!(Config::from_toml("ref_period = 2009").is_err());
    }
}
