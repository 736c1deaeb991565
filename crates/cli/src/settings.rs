//! Connection settings from flags and environment.

use anyhow::Context;
use catalog::{ClientConfig, DEFAULT_BASE_URL};
use clap::Args;

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// API base URL, e.g. https://shop.example/rest1
    #[arg(long, env = "TSOFT_API_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// API token
    #[arg(long, env = "TSOFT_API_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Log request payloads and response excerpts at debug level
    #[arg(long, env = "TSOFT_API_DEBUG", global = true)]
    pub api_debug: bool,
}

impl ConnectionArgs {
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let token = self
            .token
            .as_deref()
            .context("TSOFT_API_TOKEN is not set; pass --token or export it")?;
        ClientConfig::new(&self.base_url, token, self.api_debug)
            .context("invalid client configuration")
    }
}
