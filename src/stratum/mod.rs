//! Stratum 服务位置目录

use rigctl_core::{AlgorithmType, ConnectionType, ServiceLocationDirectory};

use crate::config::ServiceConfig;

/// 有序的服务位置列表
#[derive(Debug, Clone)]
pub struct StratumLocations {
    locations: Vec<String>,
    host_suffix: String,
}

impl StratumLocations {
    pub fn new<S: Into<String>>(locations: Vec<String>, host_suffix: S) -> Self {
        Self {
            locations,
            host_suffix: host_suffix.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.locations.clone(), config.host_suffix.clone())
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}

impl ServiceLocationDirectory for StratumLocations {
    fn location_count(&self) -> usize {
        self.locations.len()
    }

    fn location(&self, index: usize) -> Option<String> {
        self.locations.get(index).cloned()
    }

    fn location_url(
        &self,
        algorithm: AlgorithmType,
        location: &str,
        connection: ConnectionType,
    ) -> String {
        format!(
            "{}{}.{}.{}:{}",
            connection.scheme(),
            algorithm.stratum_name(),
            location,
            self.host_suffix,
            algorithm.port() + connection.port_offset()
        )
    }
}
