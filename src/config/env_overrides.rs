use super::{Config, HandoffBackend};
use std::path::PathBuf;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("RENOWIZ_HANDOFF_BACKEND")
            && let Ok(backend) = backend.parse::<HandoffBackend>()
        {
            self.handoff.backend = backend;
        }

        if let Ok(path) = std::env::var("RENOWIZ_HANDOFF_PATH")
            && !path.is_empty()
        {
            self.handoff.path = Some(PathBuf::from(path));
        }

        if let Ok(base_url) = std::env::var("RENOWIZ_BASE_URL")
            && url::Url::parse(&base_url).is_ok()
        {
            self.launch.base_url = base_url;
        }

        if let Ok(level) = std::env::var("RENOWIZ_LOG")
            && level.parse::<tracing::Level>().is_ok()
        {
            self.log_level = level;
        }
    }
}
