pub(crate) mod completions;
pub(crate) mod config;
pub(crate) mod dump;
pub(crate) mod get;
pub(crate) mod path_helpers;

pub(crate) use completions::command_completions;
pub(crate) use config::command_config;
pub(crate) use dump::command_dump;
pub(crate) use get::command_get;
