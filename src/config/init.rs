// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a commented bgdeploy.yml with the default settings spelled out.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::default());
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let endpoints = config
        .health
        .endpoints
        .iter()
        .map(|e| format!("    - {e}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"# Base URLs. BLUE_ENVIRONMENT_URL, GREEN_ENVIRONMENT_URL and PRODUCTION_URL override these.
environments:
  blue: {}
  green: {}
  production: {}

health:
  endpoints:
{}
  attempts: {}
  interval: {}s
  timeout: {}s
  threshold: {}

deploy:
  warmup: {}s
  history_limit: {}
  # deploy_command: ./scripts/release.sh
  # switch_command: ./scripts/switch-traffic.sh

files:
  state: {}
  report: {}
"#,
        config.environments.blue,
        config.environments.green,
        config.environments.production,
        endpoints,
        config.health.attempts,
        config.health.interval.as_secs(),
        config.health.timeout.as_secs(),
        config.health.threshold,
        config.deploy.warmup.as_secs(),
        config.deploy.history_limit,
        config.files.state.display(),
        config.files.report.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_back_to_defaults() {
        let yaml = generate_template_yaml(&Config::default());
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.health.attempts, 3);
        assert_eq!(parsed.health.endpoints.len(), 3);
        assert_eq!(parsed.deploy.history_limit, 10);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "{}").unwrap();

        assert!(matches!(
            init_config(dir.path(), false),
            Err(Error::AlreadyExists(_))
        ));
        assert!(init_config(dir.path(), true).is_ok());
    }
}
