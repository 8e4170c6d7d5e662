//! 持久化的通用设置

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{CredentialField, Credentials};

/// 通用设置 - 凭据和服务位置下标
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub payout_address: String,
    pub worker_name: String,
    pub rig_group: String,
    pub service_location: usize,
}

impl GeneralSettings {
    pub fn credential(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::PayoutAddress => &self.payout_address,
            CredentialField::WorkerName => &self.worker_name,
            CredentialField::RigGroup => &self.rig_group,
        }
    }

    pub fn set_credential(&mut self, field: CredentialField, value: &str) {
        let slot = match field {
            CredentialField::PayoutAddress => &mut self.payout_address,
            CredentialField::WorkerName => &mut self.worker_name,
            CredentialField::RigGroup => &mut self.rig_group,
        };
        *slot = value.to_string();
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&*self.payout_address, &*self.worker_name, &*self.rig_group)
    }

    pub fn to_toml(&self) -> Result<String, CoreError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(content)?)
    }
}
