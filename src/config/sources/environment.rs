//! Environment source: QUERYSTATE_<SECTION>__<KEY>, e.g. QUERYSTATE_SEARCH_CONTEXTS__ENABLED=false

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const PREFIX: &str = "QUERYSTATE";

/// Add the environment source. Lists are comma separated.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix(PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("search_contexts.available")
            .try_parsing(true),
    ))
}
