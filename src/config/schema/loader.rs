use super::Config;
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        Self::load_or_init_in(&home.join(".aethel"))
    }

    /// Load `config.toml` from `data_dir`, writing defaults on first run.
    /// Environment overrides are applied after the file is read.
    pub fn load_or_init_in(data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = data_dir.join("config.toml");

        if !data_dir.exists() {
            fs::create_dir_all(data_dir)?;
        }

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents).map_err(|e| {
                ConfigError::Load(format!("{}: {e}", config_path.display()))
            })?;
            config.config_path.clone_from(&config_path);
            config.data_dir = data_dir.to_path_buf();
            config
        } else {
            let config = Self {
                config_path: config_path.clone(),
                data_dir: data_dir.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("cannot serialize config: {e}")))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::{ENV_LOCK, EnvVarGuard};
    use super::*;

    #[test]
    fn first_run_writes_default_config() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _url = EnvVarGuard::unset("AETHEL_BACKEND_URL");
        let _log = EnvVarGuard::unset("AETHEL_LOG");
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".aethel");

        let config = Config::load_or_init_in(&dir).unwrap();
        assert!(dir.join("config.toml").exists());
        assert_eq!(config.data_dir, dir);
        assert_eq!(config.backend.base_url, "http://localhost:8000");

        let written = fs::read_to_string(dir.join("config.toml")).unwrap();
        assert!(written.contains("[backend]"));
        assert!(written.contains("base_url"));
    }

    #[test]
    fn existing_config_is_read_back() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _url = EnvVarGuard::unset("AETHEL_BACKEND_URL");
        let _log = EnvVarGuard::unset("AETHEL_LOG");
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[backend]\nbase_url = \"http://10.0.0.5:8000\"\n\n[transport]\nmax_backoff_ms = 5000\n",
        )
        .unwrap();

        let config = Config::load_or_init_in(tmp.path()).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.transport.max_backoff_ms, 5000);
        assert_eq!(config.config_path, tmp.path().join("config.toml"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _url = EnvVarGuard::unset("AETHEL_BACKEND_URL");
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[backend]\nbase_url = \"gopher://old\"\n",
        )
        .unwrap();

        let err = Config::load_or_init_in(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unparsable_config_names_the_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("config.toml"), "[backend\nbase_url = 3\n").unwrap();

        let err = Config::load_or_init_in(tmp.path()).unwrap_err();
        let ConfigError::Load(message) = err else {
            panic!("expected a load error, got {err:?}");
        };
        assert!(message.contains("config.toml"));
    }

    #[test]
    fn data_dir_that_is_a_file_is_an_io_error() {
        let _lock = ENV_LOCK.lock().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = Config::load_or_init_in(&blocker.join(".aethel")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
