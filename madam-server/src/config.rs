use crate::error::{ConfigErrorKind, InfraError};
use madam_core::{ArtCard, ConversationOptions, Gallery, PageOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tcp_addr: String,                // e.g. "0.0.0.0:4000"
    pub http_addr: String,               // e.g. "0.0.0.0:4001"
    pub conversation_path: PathBuf,      // e.g. "assets/conversation.json"
    pub images_dir: PathBuf,             // served under /images
    pub reveal_delay_ms: u64,
    pub spare_threshold: u32,
    pub portrait: String,
    pub portrait_alt: String,
    pub cards: Vec<ArtCard>,
}

impl Default for Config {
    fn default() -> Self {
        let conversation = ConversationOptions::default();
        Self {
            tcp_addr: "0.0.0.0:4000".to_string(),
            http_addr: "0.0.0.0:4001".to_string(),
            conversation_path: PathBuf::from("assets/conversation.json"),
            images_dir: PathBuf::from("assets/images"),
            reveal_delay_ms: 30,
            spare_threshold: conversation.spare_threshold,
            portrait: conversation.portrait_src,
            portrait_alt: conversation.portrait_alt,
            cards: Vec::new(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InfraError> {
        let path = path.as_ref();
        let config_err = |source| InfraError::Config {
            path: path.to_path_buf(),
            source,
        };

        let data = std::fs::read_to_string(path).map_err(|e| config_err(ConfigErrorKind::Read(e)))?;
        toml::from_str(&data).map_err(|e| config_err(ConfigErrorKind::Parse(e)))
    }

    pub fn from_env() -> Result<Self, InfraError> {
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from a variable lookup. `MADAM_CONFIG` names an optional TOML
    /// file, the other variables override single fields of it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InfraError> {
        let mut cfg = match lookup("MADAM_CONFIG") {
            Some(path) if !path.is_empty() => Self::load(path)?,
            _ => Self::default(),
        };

        if let Some(v) = lookup("TCP_ADDR") {
            cfg.tcp_addr = v;
        }
        if let Some(v) = lookup("HTTP_ADDR") {
            cfg.http_addr = v;
        }
        if let Some(v) = lookup("CONVERSATION_PATH") {
            cfg.conversation_path = v.into();
        }
        if let Some(v) = lookup("IMAGES_DIR") {
            cfg.images_dir = v.into();
        }
        if let Some(v) = lookup("PORTRAIT") {
            cfg.portrait = v;
        }
        override_parsed(&lookup, "REVEAL_DELAY_MS", &mut cfg.reveal_delay_ms)?;
        override_parsed(&lookup, "SPARE_THRESHOLD", &mut cfg.spare_threshold)?;

        Ok(cfg)
    }

    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
            conversation: ConversationOptions {
                portrait_src: self.portrait.clone(),
                portrait_alt: self.portrait_alt.clone(),
                spare_threshold: self.spare_threshold,
            },
        }
    }

    pub fn gallery(&self) -> Gallery {
        Gallery::new(self.cards.clone())
    }
}

fn override_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) -> Result<(), InfraError> {
    let Some(raw) = lookup(name) else {
        return Ok(());
    };

    *target = raw
        .trim()
        .parse()
        .map_err(|_| InfraError::Env(ConfigErrorKind::InvalidEnv(name.to_string(), raw.clone())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.tcp_addr, "0.0.0.0:4000");
        assert_eq!(cfg.http_addr, "0.0.0.0:4001");
        assert_eq!(cfg.reveal_delay_ms, 30);

        let opts = cfg.page_options();
        assert_eq!(opts.reveal_delay, Duration::from_millis(30));
        assert_eq!(opts.conversation, ConversationOptions::default());
    }

    #[test]
    fn environment_overrides_fields() {
        let cfg = Config::from_lookup(lookup(&[
            ("TCP_ADDR", "127.0.0.1:5000"),
            ("REVEAL_DELAY_MS", " 0 "),
            ("SPARE_THRESHOLD", "3"),
            ("PORTRAIT", "img/m.png"),
        ]))
        .unwrap();

        assert_eq!(cfg.tcp_addr, "127.0.0.1:5000");
        assert_eq!(cfg.reveal_delay_ms, 0);
        assert_eq!(cfg.page_options().conversation.spare_threshold, 3);
        assert_eq!(cfg.page_options().conversation.portrait_src, "img/m.png");
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[("SPARE_THRESHOLD", "lots")])).unwrap_err();
        assert!(err.to_string().contains("SPARE_THRESHOLD"), "{err}");
    }

    #[test]
    fn toml_file_with_cards() {
        let path = std::env::temp_dir().join(format!("madam-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
http_addr = "127.0.0.1:8080"
reveal_delay_ms = 10

[[cards]]
id = "card1"
title = "The Lovers"
caption = "Two cups, one table."

[[cards]]
id = "card2"
title = "Untitled"
"#,
        )
        .unwrap();

        let cfg = Config::from_lookup(lookup(&[
            ("MADAM_CONFIG", path.to_str().unwrap()),
            ("REVEAL_DELAY_MS", "20"),
        ]))
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cfg.http_addr, "127.0.0.1:8080");
        assert_eq!(cfg.tcp_addr, "0.0.0.0:4000");
        assert_eq!(cfg.reveal_delay_ms, 20);
        assert_eq!(cfg.cards.len(), 2);
        assert_eq!(cfg.gallery().card("card2").unwrap().caption(), madam_core::gallery::MISSING_CAPTION);
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let err = Config::from_lookup(lookup(&[("MADAM_CONFIG", "/nonexistent/madam.toml")])).unwrap_err();
        assert!(matches!(err, InfraError::Config { .. }));
        assert!(err.to_string().contains("/nonexistent/madam.toml"));
    }
}
