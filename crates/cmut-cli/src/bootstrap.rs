use anyhow::Context;
use cmut_config::CmutConfig;
use cmut_parser::FrontendOptions;

use crate::cli::Cli;

/// Load layered config, then apply command-line overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<CmutConfig> {
    let mut config = CmutConfig::load_with_dotenv().context("failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config
        .mutate
        .validate()
        .context("invalid command-line override")?;
    tracing::debug!(
        strategy = %config.mutate.strategy,
        include_paths = config.frontend.include_paths.len(),
        "configuration loaded"
    );
    Ok(config)
}

pub fn frontend_options(config: &CmutConfig) -> FrontendOptions {
    FrontendOptions {
        include_paths: config.frontend.include_paths.clone(),
        strict_include_paths: config.frontend.strict_include_paths,
        suppress_diagnostics: config.frontend.suppress_diagnostics,
    }
}
