use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("AETHEL_BACKEND_URL")
            && !url.is_empty()
        {
            self.backend.base_url = url;
        }

        if let Ok(level) = std::env::var("AETHEL_LOG")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }
}
