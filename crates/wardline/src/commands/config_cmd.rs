//! Config subcommand handlers.

use std::io::{self, IsTerminal};

use dialoguer::{Input, Select};

use wardline_config::{Config, ConfigError};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let format = config::output_format(global, &cfg);
            let out = match format {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(ConfigError::from)?
                }
                other => output::render_single(other, &cfg, |_| String::new(), |_| String::new()),
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", wardline_config::config_path().display());
            Ok(())
        }

        ConfigCommand::Init => init(global),
    }
}

/// Write a config file. Prompts in a terminal; otherwise writes the
/// defaults with any global flag overrides applied.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = wardline_config::config_path();
    if path.exists() && !util::confirm(&format!("Overwrite {}?", path.display()), global.yes)? {
        return Ok(());
    }

    let mut cfg = Config::default();
    config::apply_overrides(&mut cfg, global);

    if io::stdin().is_terminal() && !global.yes {
        output::notice(&format!("Config path: {}", path.display()), global.quiet);
        prompt_into(&mut cfg)?;
    }

    // Reject values the client would refuse before they hit disk.
    wardline_config::to_client_config(&cfg)?;

    let written = wardline_config::save_config(&cfg)?;
    let color = output::should_color(config::color_mode(global, &cfg));
    output::notice(
        &output::success(&format!("Configuration written to {}", written.display()), color),
        global.quiet,
    );
    Ok(())
}

fn prompt_into(cfg: &mut Config) -> Result<(), CliError> {
    cfg.api_url = Input::new()
        .with_prompt("API URL")
        .default(cfg.api_url.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.page_size = Input::new()
        .with_prompt("Results per page")
        .default(cfg.page_size)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.search_param = Input::new()
        .with_prompt("Search filter parameter")
        .default(cfg.search_param.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let formats = ["table", "json", "yaml", "plain"];
    let current = formats.iter().position(|f| *f == cfg.output).unwrap_or(0);
    let picked = Select::new()
        .with_prompt("Default output format")
        .items(&formats)
        .default(current)
        .interact()
        .map_err(prompt_err)?;
    cfg.output = formats[picked].to_owned();

    Ok(())
}
