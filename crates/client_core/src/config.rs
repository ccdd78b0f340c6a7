use std::{collections::HashMap, fs, str::FromStr, time::Duration};

const SETTINGS_FILE: &str = "admin.toml";

/// How local state is brought back in line with the store after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Refetch the whole collection after every successful mutation.
    #[default]
    Refetch,
    /// Splice the entity returned by the mutation into a new snapshot.
    ApplyResponse,
}

impl FromStr for ReconcileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "refetch" => Ok(ReconcileMode::Refetch),
            "apply_response" | "apply" => Ok(ReconcileMode::ApplyResponse),
            other => Err(format!("unknown reconcile mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub reconcile: ReconcileMode,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".into(),
            request_timeout: Duration::from_secs(10),
            max_retries: 1,
            retry_delay: Duration::from_millis(250),
            reconcile: ReconcileMode::Refetch,
        }
    }
}

pub fn load_client_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unreadable settings file");
        return;
    };
    apply_overrides(settings, |key| {
        let file_key = match key {
            "CATALOG_SERVER_URL" => "server_url",
            "CATALOG_TIMEOUT_SECS" => "timeout_secs",
            "CATALOG_MAX_RETRIES" => "max_retries",
            "CATALOG_RECONCILE" => "reconcile",
            _ => return None,
        };
        file_cfg.get(file_key).cloned()
    });
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    apply_overrides(settings, lookup);
}

fn apply_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CATALOG_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("CATALOG_TIMEOUT_SECS") {
        if let Ok(secs) = v.parse::<u64>() {
            settings.request_timeout = Duration::from_secs(secs);
        }
    }
    if let Some(v) = lookup("CATALOG_MAX_RETRIES") {
        if let Ok(retries) = v.parse::<u32>() {
            settings.max_retries = retries;
        }
    }
    if let Some(v) = lookup("CATALOG_RECONCILE") {
        match v.parse::<ReconcileMode>() {
            Ok(mode) => settings.reconcile = mode,
            Err(err) => tracing::warn!(%err, "keeping default reconcile mode"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_keys_map_onto_settings() {
        let mut settings = ClientSettings::default();
        apply_file_overrides(
            &mut settings,
            r#"
            server_url = "http://catalog.internal:8080"
            timeout_secs = "3"
            reconcile = "apply-response"
            "#,
        );
        assert_eq!(settings.server_url, "http://catalog.internal:8080");
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert_eq!(settings.reconcile, ReconcileMode::ApplyResponse);
        assert_eq!(settings.max_retries, 1);
    }

    #[test]
    fn env_overrides_file_and_ignores_garbage() {
        let mut settings = ClientSettings::default();
        apply_env_overrides(&mut settings, |key| match key {
            "CATALOG_MAX_RETRIES" => Some("4".into()),
            "CATALOG_TIMEOUT_SECS" => Some("soon".into()),
            "CATALOG_RECONCILE" => Some("optimistic".into()),
            _ => None,
        });
        assert_eq!(settings.max_retries, 4);
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.reconcile, ReconcileMode::Refetch);
    }
}
