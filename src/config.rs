use crate::attr::MissingNodePolicy;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no store endpoints given")]
    NoEndpoints,
}

#[derive(Debug)]
pub struct Config {
    pub mountpoint: PathBuf,
    pub endpoints: Vec<String>,
    pub attr_ttl: Duration,
    pub connect_timeout: Duration,
    pub missing_node: MissingNodePolicy,
}

impl Config {
    pub fn new(
        mountpoint: PathBuf,
        endpoints: &str,
        attr_ttl: Duration,
        connect_timeout: Duration,
        missing_node: MissingNodePolicy,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            mountpoint,
            endpoints: parse_endpoints(endpoints)?,
            attr_ttl,
            connect_timeout,
            missing_node,
        })
    }
}

/// Splits a comma-separated `host:port` list, ignoring blank entries.
pub fn parse_endpoints(raw: &str) -> Result<Vec<String>, ConfigError> {
    let endpoints: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|endpoint| !endpoint.is_empty())
        .map(str::to_string)
        .collect();
    if endpoints.is_empty() {
        return Err(ConfigError::NoEndpoints);
    }
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_split_and_trimmed() {
        assert_eq!(
            parse_endpoints("zk1:2181, zk2:2181,,zk3:2181 ").unwrap(),
            vec!["zk1:2181", "zk2:2181", "zk3:2181"]
        );
        assert_eq!(parse_endpoints("localhost:2181").unwrap(), vec!["localhost:2181"]);
    }

    #[test]
    fn blank_endpoint_list_is_rejected() {
        assert_eq!(parse_endpoints(""), Err(ConfigError::NoEndpoints));
        assert_eq!(parse_endpoints(" , ,"), Err(ConfigError::NoEndpoints));
    }

    #[test]
    fn config_carries_policy() {
        let config = Config::new(
            PathBuf::from("/mnt/zk"),
            "a:1,b:2",
            Duration::from_secs(1),
            Duration::from_secs(10),
            MissingNodePolicy::Strict,
        )
        .unwrap();
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.missing_node, MissingNodePolicy::Strict);
    }
}
