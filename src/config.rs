//! Server configuration from environment variables. Unset or unparseable values use defaults.

use crate::models::{default_court_names, BoardSettings, DEFAULT_GAME_SECONDS};
use std::path::PathBuf;

const MAX_PLAYERS_PER_COURT: usize = 8;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory for stored board snapshots.
    pub data_dir: PathBuf,
    /// One court per name, in display order.
    pub court_names: Vec<String>,
    pub board: BoardSettings,
    /// Cookie signing key material (at least 64 bytes); None means generate one per run.
    pub session_key: Option<Vec<u8>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            court_names: default_court_names(),
            board: BoardSettings::default(),
            session_key: None,
        }
    }
}

impl ServerConfig {
    /// Read HOST, PORT, DATA_DIR, COURT_NAMES, GAME_MINUTES, PLAYERS_PER_COURT,
    /// AUTO_ADVANCE_AUTO_STARTS and SESSION_KEY.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            cfg.host = host.trim().to_string();
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            cfg.port = port;
        }
        if let Some(dir) = lookup("DATA_DIR").filter(|d| !d.trim().is_empty()) {
            cfg.data_dir = PathBuf::from(dir.trim());
        }

        if let Some(names) = lookup("COURT_NAMES") {
            let names: Vec<String> = names
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !names.is_empty() {
                cfg.court_names = names;
            }
        }

        let minutes = lookup("GAME_MINUTES")
            .and_then(|m| m.trim().parse::<u32>().ok())
            .map(|m| m.saturating_mul(60))
            .unwrap_or(DEFAULT_GAME_SECONDS);
        cfg.board.game_seconds = cfg.board.clamp_seconds(minutes);

        if let Some(n) = lookup("PLAYERS_PER_COURT").and_then(|n| n.trim().parse::<usize>().ok()) {
            cfg.board.players_per_court = n.clamp(1, MAX_PLAYERS_PER_COURT);
        }

        if let Some(flag) = lookup("AUTO_ADVANCE_AUTO_STARTS").and_then(|v| parse_bool(&v)) {
            cfg.board.auto_advance_auto_starts = flag;
        }

        cfg.session_key = lookup("SESSION_KEY")
            .map(String::into_bytes)
            .filter(|k| k.len() >= 64);

        cfg
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.server_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.court_names, vec!["Court 1", "Court 2", "Court 3"]);
        assert_eq!(cfg.board.game_seconds, 15 * 60);
        assert_eq!(cfg.board.players_per_court, 4);
        assert!(cfg.board.auto_advance_auto_starts);
        assert!(cfg.session_key.is_none());
    }

    #[test]
    fn fixed_court_layout_and_stop_on_expiry() {
        let cfg = config_from(&[
            ("COURT_NAMES", "Door, Middle , ,Far"),
            ("AUTO_ADVANCE_AUTO_STARTS", "false"),
            ("PLAYERS_PER_COURT", "2"),
        ]);
        assert_eq!(cfg.court_names, vec!["Door", "Middle", "Far"]);
        assert!(!cfg.board.auto_advance_auto_starts);
        assert_eq!(cfg.board.players_per_court, 2);
    }

    #[test]
    fn out_of_range_values_are_clamped_or_ignored() {
        let cfg = config_from(&[
            ("GAME_MINUTES", "600"),
            ("PLAYERS_PER_COURT", "0"),
            ("PORT", "not-a-port"),
            ("SESSION_KEY", "too-short"),
        ]);
        assert_eq!(cfg.board.game_seconds, 60 * 60);
        assert_eq!(cfg.board.players_per_court, 1);
        assert_eq!(cfg.port, 8080);
        assert!(cfg.session_key.is_none());
    }
}
