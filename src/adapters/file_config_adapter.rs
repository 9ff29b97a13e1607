//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive; values keep their case.

use crate::domain::error::PortsimError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PortsimError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| PortsimError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, PortsimError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| PortsimError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(&section.to_lowercase())
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
dir = ./data

[portfolio]
holdings = SPY:0.6, TLT:0.4

[strategy]
id = Balanced Momentum
top_n = 2
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("data", "dir"), Some("./data".to_string()));
        assert_eq!(
            adapter.get_string("portfolio", "holdings"),
            Some("SPY:0.6, TLT:0.4".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "id"),
            Some("Balanced Momentum".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn section_and_key_names_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Strategy]\nTop_N = 4\nType = Momentum\n")
            .unwrap();
        assert_eq!(adapter.get_string("strategy", "top_n"), Some("4".to_string()));
        assert_eq!(
            adapter.get_string("strategy", "type"),
            Some("Momentum".to_string())
        );
        assert_eq!(adapter.keys("STRATEGY"), vec!["top_n", "type"]);
    }

    #[test]
    fn keys_lists_section_entries() {
        let adapter = FileConfigAdapter::from_string(
            "[strategy]\ntype = momentum\nlookback_period = 20\ntop_n = 2\n",
        )
        .unwrap();
        assert_eq!(
            adapter.keys("strategy"),
            vec!["lookback_period", "top_n", "type"]
        );
        assert!(adapter.keys("portfolio").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[data]\ndir = /srv/prices\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "dir"),
            Some("/srv/prices".to_string())
        );
    }

    #[test]
    fn from_file_reports_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(
            result,
            Err(PortsimError::ConfigParse { file, .. }) if file.contains("nonexistent")
        ));
    }
}
