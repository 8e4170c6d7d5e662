//! 基础类型定义

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::error::CoreError;

/// 校验型设置操作的三态结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetResult {
    /// 候选值未通过校验
    Invalid,
    /// 候选值与当前值相同
    NoChange,
    /// 已应用、已提交并已通知
    Changed,
}

impl fmt::Display for SetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetResult::Invalid => write!(f, "invalid"),
            SetResult::NoChange => write!(f, "no change"),
            SetResult::Changed => write!(f, "changed"),
        }
    }
}

/// 凭据有效性位标志
///
/// `VALID` 为空集合，`INVALID_BTC` 与 `INVALID_WORKER` 可以通过 `|` 组合，
/// 组合结果等于 `INVALID_BTC_AND_WORKER`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CredentialValidity(u32);

impl CredentialValidity {
    pub const VALID: Self = Self(0);
    pub const INVALID_BTC: Self = Self(1);
    pub const INVALID_WORKER: Self = Self(1 << 1);
    pub const INVALID_BTC_AND_WORKER: Self = Self(Self::INVALID_BTC.0 | Self::INVALID_WORKER.0);

    pub fn is_valid(self) -> bool {
        self == Self::VALID
    }

    /// 是否包含 `other` 的全部位
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CredentialValidity {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CredentialValidity {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CredentialValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::VALID => write!(f, "VALID"),
            Self::INVALID_BTC => write!(f, "INVALID_BTC"),
            Self::INVALID_WORKER => write!(f, "INVALID_WORKER"),
            Self::INVALID_BTC_AND_WORKER => write!(f, "INVALID_BTC_AND_WORKER"),
            Self(bits) => write!(f, "UNKNOWN({:#x})", bits),
        }
    }
}

/// 凭据字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialField {
    /// 收款地址
    PayoutAddress,
    /// 矿工名
    WorkerName,
    /// 矿机分组
    RigGroup,
}

impl CredentialField {
    pub const ALL: [CredentialField; 3] = [
        CredentialField::PayoutAddress,
        CredentialField::WorkerName,
        CredentialField::RigGroup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CredentialField::PayoutAddress => "payout_address",
            CredentialField::WorkerName => "worker_name",
            CredentialField::RigGroup => "rig_group",
        }
    }

    /// 该字段变更时运行中的矿工进程是否需要重启
    pub fn restarts_miners(self) -> bool {
        !matches!(self, CredentialField::RigGroup)
    }

    /// 数组下标，用于按字段分配的资源
    pub fn index(self) -> usize {
        match self {
            CredentialField::PayoutAddress => 0,
            CredentialField::WorkerName => 1,
            CredentialField::RigGroup => 2,
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 凭据快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub payout_address: String,
    pub worker_name: String,
    pub rig_group: String,
}

impl Credentials {
    pub fn new<A, W, G>(payout_address: A, worker_name: W, rig_group: G) -> Self
    where
        A: Into<String>,
        W: Into<String>,
        G: Into<String>,
    {
        Self {
            payout_address: payout_address.into(),
            worker_name: worker_name.into(),
            rig_group: rig_group.into(),
        }
    }

    /// 去除首尾空白后的副本
    pub fn trimmed(&self) -> Self {
        Self {
            payout_address: self.payout_address.trim().to_string(),
            worker_name: self.worker_name.trim().to_string(),
            rig_group: self.rig_group.trim().to_string(),
        }
    }

    pub fn get(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::PayoutAddress => &self.payout_address,
            CredentialField::WorkerName => &self.worker_name,
            CredentialField::RigGroup => &self.rig_group,
        }
    }
}

/// 挖矿会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MiningSessionState {
    /// 未挖矿
    #[default]
    Stopped,
    /// 挖矿中
    Running,
}

impl fmt::Display for MiningSessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiningSessionState::Stopped => write!(f, "stopped"),
            MiningSessionState::Running => write!(f, "running"),
        }
    }
}

/// 算法类型，数值标识决定 stratum 端口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmType {
    DaggerHashimoto,
    Equihash,
    CryptoNightV7,
    Lyra2Z,
    X16R,
    CryptoNightV8,
    ZHash,
    Beam,
    GrinCuckaroo29,
    GrinCuckatoo31,
    Lyra2REv3,
    Mtp,
    CryptoNightR,
    CuckooCycle,
}

impl AlgorithmType {
    pub const ALL: [AlgorithmType; 14] = [
        AlgorithmType::DaggerHashimoto,
        AlgorithmType::Equihash,
        AlgorithmType::CryptoNightV7,
        AlgorithmType::Lyra2Z,
        AlgorithmType::X16R,
        AlgorithmType::CryptoNightV8,
        AlgorithmType::ZHash,
        AlgorithmType::Beam,
        AlgorithmType::GrinCuckaroo29,
        AlgorithmType::GrinCuckatoo31,
        AlgorithmType::Lyra2REv3,
        AlgorithmType::Mtp,
        AlgorithmType::CryptoNightR,
        AlgorithmType::CuckooCycle,
    ];

    pub fn id(self) -> u16 {
        match self {
            AlgorithmType::DaggerHashimoto => 20,
            AlgorithmType::Equihash => 24,
            AlgorithmType::CryptoNightV7 => 30,
            AlgorithmType::Lyra2Z => 32,
            AlgorithmType::X16R => 33,
            AlgorithmType::CryptoNightV8 => 34,
            AlgorithmType::ZHash => 36,
            AlgorithmType::Beam => 37,
            AlgorithmType::GrinCuckaroo29 => 38,
            AlgorithmType::GrinCuckatoo31 => 39,
            AlgorithmType::Lyra2REv3 => 40,
            AlgorithmType::Mtp => 41,
            AlgorithmType::CryptoNightR => 42,
            AlgorithmType::CuckooCycle => 43,
        }
    }

    /// stratum 主机名中使用的算法名
    pub fn stratum_name(self) -> &'static str {
        match self {
            AlgorithmType::DaggerHashimoto => "daggerhashimoto",
            AlgorithmType::Equihash => "equihash",
            AlgorithmType::CryptoNightV7 => "cryptonightv7",
            AlgorithmType::Lyra2Z => "lyra2z",
            AlgorithmType::X16R => "x16r",
            AlgorithmType::CryptoNightV8 => "cryptonightv8",
            AlgorithmType::ZHash => "zhash",
            AlgorithmType::Beam => "beam",
            AlgorithmType::GrinCuckaroo29 => "grincuckaroo29",
            AlgorithmType::GrinCuckatoo31 => "grincuckatoo31",
            AlgorithmType::Lyra2REv3 => "lyra2rev3",
            AlgorithmType::Mtp => "mtp",
            AlgorithmType::CryptoNightR => "cryptonightr",
            AlgorithmType::CuckooCycle => "cuckoocycle",
        }
    }

    /// 普通 TCP 端口
    pub fn port(self) -> u16 {
        3333 + self.id()
    }
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stratum_name())
    }
}

impl FromStr for AlgorithmType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AlgorithmType::ALL
            .iter()
            .copied()
            .find(|algorithm| algorithm.stratum_name() == wanted)
            .ok_or_else(|| CoreError::config(format!("unknown algorithm: {}", s)))
    }
}

/// 连接类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionType {
    #[default]
    StratumTcp,
    StratumSsl,
}

impl ConnectionType {
    pub fn scheme(self) -> &'static str {
        match self {
            ConnectionType::StratumTcp => "stratum+tcp://",
            ConnectionType::StratumSsl => "stratum+ssl://",
        }
    }

    /// 在算法基础端口上的偏移
    pub fn port_offset(self) -> u16 {
        match self {
            ConnectionType::StratumTcp => 0,
            ConnectionType::StratumSsl => 30000,
        }
    }
}
