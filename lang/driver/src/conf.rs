use sculptor::{AppAuthor, impl_serde_str_toml};
use serde::{Deserialize, Serialize};

/// Where the component pipeline stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Check,
    Translate,
    #[default]
    Evaluate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    pub stop_after: Stage,
    /// line width of rendered translations
    pub width: usize,
    /// log every translation at `info`
    pub log_translation: bool,
}

impl Default for Conf {
    fn default() -> Self {
        Conf { stop_after: Stage::default(), width: 100, log_translation: false }
    }
}

impl_serde_str_toml!(Conf);

impl Conf {
    /// Reads a configuration written in toml; missing fields take defaults.
    pub fn parse(text: &str) -> crate::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

impl AppAuthor for Conf {
    fn app_name() -> &'static str {
        "Typy"
    }

    fn author() -> &'static str {
        "typy-lang"
    }
}
