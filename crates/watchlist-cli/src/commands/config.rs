use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use serde_json::json;
use std::path::Path;
use watchlist_config::Config;

pub fn run_config(cmd: crate::ConfigCommands, config: &Config, path: &Path, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show => show_config(config, path, output),
        crate::ConfigCommands::Init { force } => init_config(path, force, output),
    }
}

fn show_config(config: &Config, path: &Path, output: &Output) -> Result<()> {
    match output.format() {
        OutputFormat::Human => {
            if !path.exists() {
                output.warn(format!("No config file at {}; showing defaults", path.display()));
            }
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to render config: {}", e))?;
            output.info(format!("# {}", path.display()));
            output.info(rendered.trim_end());
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let value = serde_json::to_value(config)?;
            output.json(&json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
                "config": value,
            }));
        }
    }
    Ok(())
}

fn init_config(path: &Path, force: bool, output: &Output) -> Result<()> {
    if path.exists() && !force {
        output.warn(format!(
            "Config file already exists at {}. Use --force to overwrite it.",
            path.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(path)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write config to {}: {}", path.display(), e))?;

    output.success(format!("Wrote default configuration to {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults_and_respects_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Human, true);

        init_config(&path, false, &output).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), Config::default());

        std::fs::write(&path, "[channel]\nrequest_timeout_ms = 900\n").unwrap();
        init_config(&path, false, &output).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap().channel.request_timeout_ms, 900);

        init_config(&path, true, &output).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), Config::default());
    }
}
