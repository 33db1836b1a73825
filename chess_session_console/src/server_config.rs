use std::fs;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::network;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AllowedOrigin {
    Any,
    ThisSite(String),
}

impl AllowedOrigin {
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match self {
            AllowedOrigin::Any => true,
            AllowedOrigin::ThisSite(site) => origin == Some(site.as_str()),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    // FEN. Classic starting position if missing.
    pub starting_position: Option<String>,
    pub allowed_origin: AllowedOrigin,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_address: format!("0.0.0.0:{}", network::PORT),
            starting_position: None,
            allowed_origin: AllowedOrigin::Any,
        }
    }
}

pub fn read_config_file(filename: &str) -> anyhow::Result<ServerConfig> {
    let contents = fs::read_to_string(filename)
        .with_context(|| format!("Cannot read config file {}", filename))?;
    parse_config(&contents).with_context(|| format!("Cannot parse config file {}", filename))
}

fn parse_config(contents: &str) -> anyhow::Result<ServerConfig> {
    Ok(serde_yaml::from_str(contents)?)
}
