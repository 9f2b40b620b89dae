/// Space instance used when no override is configured.
pub const DEFAULT_SPACE_ID: &str = "Sanjai2004/Veritasq";

/// Environment variable overriding the space id.
pub const ENV_SPACE_ID: &str = "VERITASQ_SPACE_ID";

/// Environment variable carrying the optional bearer token.
pub const ENV_TOKEN: &str = "VERITASQ_HF_TOKEN";

/// Connection settings for the remote space, read at call time.
#[derive(Debug, Clone)]
pub struct SpaceConfig {
    /// Space identifier, `owner/name`.
    pub space_id: String,
    /// Optional bearer credential. `None` means anonymous/public access.
    pub token: Option<String>,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            space_id: DEFAULT_SPACE_ID.to_string(),
            token: None,
        }
    }
}

impl SpaceConfig {
    /// Read configuration from the environment. Unset or empty variables
    /// fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            space_id: non_empty_env(ENV_SPACE_ID).unwrap_or_else(|| DEFAULT_SPACE_ID.to_string()),
            token: non_empty_env(ENV_TOKEN),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env mutations cannot race a parallel test.
    #[test]
    fn env_overrides_and_empty_values() {
        std::env::remove_var(ENV_SPACE_ID);
        std::env::remove_var(ENV_TOKEN);
        let cfg = SpaceConfig::from_env();
        assert_eq!(cfg.space_id, DEFAULT_SPACE_ID);
        assert_eq!(cfg.token, None);

        std::env::set_var(ENV_SPACE_ID, "");
        std::env::set_var(ENV_TOKEN, "   ");
        let cfg = SpaceConfig::from_env();
        assert_eq!(cfg.space_id, DEFAULT_SPACE_ID, "empty value means unset");
        assert_eq!(cfg.token, None, "whitespace value means unset");

        std::env::set_var(ENV_SPACE_ID, "other-org/other-space");
        std::env::set_var(ENV_TOKEN, "hf_secret");
        let cfg = SpaceConfig::from_env();
        assert_eq!(cfg.space_id, "other-org/other-space");
        assert_eq!(cfg.token.as_deref(), Some("hf_secret"));

        std::env::remove_var(ENV_SPACE_ID);
        std::env::remove_var(ENV_TOKEN);
    }

    #[test]
    fn default_points_at_the_public_space() {
        let cfg = SpaceConfig::default();
        assert_eq!(cfg.space_id, DEFAULT_SPACE_ID);
        assert!(cfg.token.is_none());
    }
}
