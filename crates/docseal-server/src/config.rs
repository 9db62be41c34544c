// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration loading.
//
// Sources, later ones winning:
//   1. built-in defaults (`AppConfig::default`)
//   2. `docseal.toml` in the working directory, or the file named by
//      `DOCSEAL_CONFIG`
//   3. environment variables `DOCSEAL__<SECTION>__<KEY>`, e.g.
//      `DOCSEAL__SERVER__PORT=8080`

use std::path::{Path, PathBuf};

use docseal_core::config::AppConfig;
use docseal_core::error::{DocsealError, Result};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "docseal.toml";
pub const CONFIG_PATH_VAR: &str = "DOCSEAL_CONFIG";
pub const ENV_PREFIX: &str = "DOCSEAL";

/// Load the process configuration from the standard locations.
pub fn load() -> Result<AppConfig> {
    let file = match std::env::var_os(CONFIG_PATH_VAR) {
        // An explicitly named file must exist.
        Some(path) if !path.is_empty() => Some((PathBuf::from(path), true)),
        _ => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some((default, false))
        }
    };
    load_from(file.as_ref().map(|(path, required)| (path.as_path(), *required)))
}

/// Load `file` if given, then the environment. Anything neither sets keeps
/// its `AppConfig` default.
pub fn load_from(file: Option<(&Path, bool)>) -> Result<AppConfig> {
    let mut builder = config::Config::builder();

    if let Some((path, required)) = file {
        debug!(path = %path.display(), "reading configuration file");
        builder = builder.add_source(config::File::from(path).required(required));
    }

    builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(config_error)
}

fn config_error(e: config::ConfigError) -> DocsealError {
    DocsealError::Config(e.to_string())
}
