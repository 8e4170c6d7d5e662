//! 凭据校验
//!
//! 收款地址使用 Base58Check 校验：解码后必须是 25 字节，
//! 版本字节在允许列表内，末尾 4 字节等于前 21 字节双 SHA-256 的前 4 字节。
//! 矿工名只允许 ASCII 字母和数字，最长 15 个字符，允许为空。

use rigctl_core::CredentialValidator;
use sha2::{Digest, Sha256};
use tracing::debug;

/// 矿工名最大长度
pub const MAX_WORKER_NAME_LEN: usize = 15;

/// Base58Check 地址的原始长度
const ADDRESS_PAYLOAD_LEN: usize = 25;

/// 主网 P2PKH / P2SH 版本字节
pub const MAINNET_VERSIONS: &[u8] = &[0x00, 0x05];

/// 测试网 P2PKH / P2SH 版本字节
pub const TESTNET_VERSIONS: &[u8] = &[0x6f, 0xc4];

/// 默认凭据校验器
#[derive(Debug, Clone)]
pub struct RigCredentialValidator {
    allowed_versions: Vec<u8>,
}

impl RigCredentialValidator {
    pub fn new(allowed_versions: &[u8]) -> Self {
        Self {
            allowed_versions: allowed_versions.to_vec(),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(MAINNET_VERSIONS)
    }

    pub fn testnet() -> Self {
        Self::new(TESTNET_VERSIONS)
    }
}

impl Default for RigCredentialValidator {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl CredentialValidator for RigCredentialValidator {
    fn validate_payout_address(&self, address: &str) -> bool {
        match decode_base58check(address) {
            Some(version) => self.allowed_versions.contains(&version),
            None => false,
        }
    }

    fn validate_worker_name(&self, worker_name: &str) -> bool {
        worker_name.len() <= MAX_WORKER_NAME_LEN
            && worker_name.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

/// 解码并校验 Base58Check 地址，成功时返回版本字节
fn decode_base58check(address: &str) -> Option<u8> {
    if address.is_empty() {
        return None;
    }

    let decoded = match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Address is not valid base58: {}", e);
            return None;
        }
    };

    if decoded.len() != ADDRESS_PAYLOAD_LEN {
        debug!("Address payload length {} is invalid", decoded.len());
        return None;
    }

    let (payload, checksum) = decoded.split_at(ADDRESS_PAYLOAD_LEN - 4);
    if double_sha256(payload)[..4] != *checksum {
        debug!("Address checksum mismatch");
        return None;
    }

    Some(payload[0])
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造带正确校验和的地址
    fn make_address(version: u8, fill: u8) -> String {
        let mut payload = vec![version];
        payload.extend_from_slice(&[fill; 20]);
        let checksum = double_sha256(&payload);
        payload.extend_from_slice(&checksum[..4]);
        bs58::encode(payload).into_string()
    }

    #[test]
    fn test_known_mainnet_address() {
        let validator = RigCredentialValidator::mainnet();
        assert!(validator.validate_payout_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
    }

    #[test]
    fn test_constructed_addresses() {
        let validator = RigCredentialValidator::mainnet();
        assert!(validator.validate_payout_address(&make_address(0x00, 7)));
        assert!(validator.validate_payout_address(&make_address(0x05, 9)));
        assert!(!validator.validate_payout_address(&make_address(0x6f, 7)));

        let testnet = RigCredentialValidator::testnet();
        assert!(testnet.validate_payout_address(&make_address(0x6f, 7)));
        assert!(!testnet.validate_payout_address(&make_address(0x00, 7)));
    }

    #[test]
    fn test_invalid_addresses() {
        let validator = RigCredentialValidator::default();

        // 空字符串
        assert!(!validator.validate_payout_address(""));
        // 非 base58 字符
        assert!(!validator.validate_payout_address("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OI"));
        // 长度错误
        assert!(!validator.validate_payout_address("1111"));

        // 校验和错误
        let mut bytes = bs58::decode(make_address(0x00, 3)).into_vec().unwrap();
        bytes[10] ^= 0xff;
        let corrupted = bs58::encode(bytes).into_string();
        assert!(!validator.validate_payout_address(&corrupted));
    }

    #[test]
    fn test_worker_names() {
        let validator = RigCredentialValidator::default();

        assert!(validator.validate_worker_name(""));
        assert!(validator.validate_worker_name("rig01"));
        assert!(validator.validate_worker_name("ABCDEFGHIJKLMNO"));
        assert!(!validator.validate_worker_name("ABCDEFGHIJKLMNOP"));
        assert!(!validator.validate_worker_name("rig 01"));
        assert!(!validator.validate_worker_name("rig-01"));
        assert!(!validator.validate_worker_name("矿机"));
    }
}
