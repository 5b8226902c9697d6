use crate::config::Config;
use crate::data::{read_series_file, write_series_file};
use crate::rebase::{Rebaser, rebase_with_base};
use crate::series::Series;
use anyhow::{Context, Result, bail};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    data_dir: PathBuf,
    cfg: Config,
    rebaser: Rebaser,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(data_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        let rebaser = Rebaser::from_config(&cfg);

        Ok(Self {
            data_dir,
            cfg,
            rebaser,
        })
    }

    pub fn rebase_all(&self) -> Result<usize> {
        let series_files = self.series_files().context("failed to list series files")?;

        let rebased_dir = self.rebased_dir();
        fs::create_dir_all(&rebased_dir)
            .with_context(|| format!("failed to create {rebased_dir:?}"))?;

        for series_file in &series_files {
            self.rebase_file(series_file)
                .with_context(|| format!("failed to rebase {series_file:?}"))?;
        }

        Ok(series_files.len())
    }

    pub fn report_bases(&self) -> Result<()> {
        for series_file in self.series_files().context("failed to list series files")? {
            let series = self.read(&series_file)?;
            let base = self
                .rebaser
                .base_value(&series)
                .with_context(|| format!("failed to compute base of {series_file:?}"))?;
            log::info!(
                "{series_file:?}: base {:?} = {} (n = {}, std_dev = {})",
                base.period,
                base.value(),
                base.stats.n_vals,
                base.stats.std_dev
            );
        }

        Ok(())
    }

    pub fn clean(&self) -> Result<()> {
        let rebased_dir = self.rebased_dir();
        if rebased_dir.exists() {
            fs::remove_dir_all(&rebased_dir)
                .with_context(|| format!("failed to remove {rebased_dir:?}"))?;
            log::info!("removed {rebased_dir:?}");
        }

        Ok(())
    }

    fn rebase_file(&self, series_file: &Path) -> Result<()> {
        let series = self.read(series_file)?;

        let base = self
            .rebaser
            .base_value(&series)
            .context("failed to compute base")?;
        let rebased = rebase_with_base(&series, &base).context("failed to divide by base")?;

        let file_name = series_file.file_name().context("series file has no name")?;
        let rebased_file = self.rebased_dir().join(file_name);
        write_series_file(
            &rebased_file,
            &rebased,
            &self.cfg.label_column,
            &self.cfg.value_column,
        )
        .with_context(|| format!("failed to write {rebased_file:?}"))?;

        log::info!(
            "rebased {series_file:?} ({} entries, {} missing) to base {} = {}",
            series.len(),
            series.n_missing(),
            base.period,
            base.value()
        );

        Ok(())
    }

    fn read(&self, series_file: &Path) -> Result<Series> {
        read_series_file(series_file, &self.cfg.label_column, &self.cfg.value_column)
            .with_context(|| format!("failed to read {series_file:?}"))
    }

    fn series_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.series_dir().join("*.csv");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut files: Vec<_> = glob(pattern)
            .context("failed to glob series files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        if files.is_empty() {
            bail!("no series files match {pattern:?}");
        }
        Ok(files)
    }

    fn series_dir(&self) -> PathBuf {
        self.data_dir.join("series")
    }

    fn rebased_dir(&self) -> PathBuf {
        self.data_dir.join("rebased")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_series;
    use std::{env, process};

    fn make_data_dir(name: &str, config: &str) -> PathBuf {
        let data_dir = env::temp_dir().join(format!("cpirebase-{name}-{}", process::id()));
        fs::remove_dir_all(&data_dir).ok();
        fs::create_dir_all(data_dir.join("series")).unwrap();
        fs::write(data_dir.join("config.toml"), config).unwrap();
        data_dir
    }

    #[test]
    fn requires_config() {
        let data_dir = env::temp_dir().join(format!("cpirebase-noconfig-{}", process::id()));
        fs::remove_dir_all(&data_dir).ok();
        fs::create_dir_all(&data_dir).unwrap();
        assert!(Manager::new(&data_dir).is_err());
        fs::remove_dir_all(&data_dir).ok();
    }

    #[test]
    fn rebase_clean_cycle() {
        let data_dir = make_data_dir("cycle", "value_column = \"CPIAUCSL\"\n");
        fs::write(
            data_dir.join("series").join("us.csv"),
            "DATE,CPIAUCSL\n2008-12-01,90\n2009-01-01,95\n2009-02-01,.\n2009-03-01,105\n2010-01-01,120\n",
        )
        .unwrap();
        fs::write(
            data_dir.join("series").join("annual.csv"),
            "date,CPIAUCSL\n2009,50\n2010,100\n",
        )
        .unwrap();

        let mgr = Manager::new(&data_dir).unwrap();
        assert_eq!(mgr.rebase_all().unwrap(), 2);
        mgr.report_bases().unwrap();

        let text = fs::read_to_string(data_dir.join("rebased").join("us.csv")).unwrap();
        let rebased = read_series(text.as_bytes(), "date", "CPIAUCSL").unwrap();
        assert_eq!(
            rebased.values(),
            [Some(0.9), Some(0.95), None, Some(1.05), Some(1.2)]
        );

        let text = fs::read_to_string(data_dir.join("rebased").join("annual.csv")).unwrap();
        assert_eq!(text, "date,CPIAUCSL\n2009,1\n2010,2\n");

        mgr.clean().unwrap();
        assert!(!data_dir.join("rebased").exists());
        mgr.clean().unwrap();

        fs::remove_dir_all(&data_dir).ok();
    }

    #[test]
    fn fails_without_reference_period() {
        let data_dir = make_data_dir("noref", "");
        fs::write(
            data_dir.join("series").join("cpi.csv"),
            "date,cpi\n2008,90\n2010,120\n",
        )
        .unwrap();

        let mgr = Manager::new(&data_dir).unwrap();
        let err = mgr.rebase_all().unwrap_err();
        assert!(format!("{err:#}").contains("missing reference period"));
        assert!(!data_dir.join("rebased").join("cpi.csv").exists());

        fs::remove_dir_all(&data_dir).ok();
    }

    #[test]
    fn fails_without_series_files() {
        let data_dir = make_data_dir("empty", "");
        let mgr = Manager::new(&data_dir).unwrap();
        assert!(mgr.rebase_all().is_err());
        fs::remove_dir_all(&data_dir).ok();
    }
}
