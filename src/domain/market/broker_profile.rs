use super::physics::PhysicsDescriptor;
use super::symbol::is_otc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const OTC_RELIABILITY_PENALTY: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrokerId {
    PocketOption,
    IqOption,
    Quotex,
    Institutional,
}

impl FromStr for BrokerId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "POCKET_OPTION" => Ok(BrokerId::PocketOption),
            "IQ_OPTION" => Ok(BrokerId::IqOption),
            "QUOTEX" => Ok(BrokerId::Quotex),
            "INSTITUTIONAL" => Ok(BrokerId::Institutional),
            _ => anyhow::bail!(
                "Invalid broker: {}. Must be POCKET_OPTION, IQ_OPTION, QUOTEX or INSTITUTIONAL",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicsBias {
    Smooth,
    Noisy,
    Institutional,
    Synthetic,
}

/// Static characteristics of a broker's price feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerProfile {
    pub id: BrokerId,
    pub name: String,
    pub tick_resolution: f64,
    pub observed_spread: f64,
    /// Seconds
    pub max_expiry: u32,
    pub is_synthetic: bool,
    pub reliability_score: u8,
    pub physics_bias: PhysicsBias,
}

fn definition(id: BrokerId) -> (&'static str, u8, PhysicsBias) {
    match id {
        BrokerId::PocketOption => ("Pocket Option", 82, PhysicsBias::Synthetic),
        BrokerId::IqOption => ("IQ Option", 88, PhysicsBias::Smooth),
        BrokerId::Quotex => ("Quotex", 85, PhysicsBias::Noisy),
        BrokerId::Institutional => ("Direct LP (Institutional)", 98, PhysicsBias::Institutional),
    }
}

pub fn broker_profile(symbol: &str, physics: &PhysicsDescriptor, id: BrokerId) -> BrokerProfile {
    let otc = is_otc(symbol);
    let (name, reliability, bias) = definition(id);

    BrokerProfile {
        id,
        name: name.to_string(),
        tick_resolution: if bias == PhysicsBias::Noisy { 0.5 } else { 2.0 },
        observed_spread: physics.spread,
        max_expiry: if otc { 300 } else { 3600 },
        is_synthetic: otc,
        reliability_score: if otc {
            reliability.saturating_sub(OTC_RELIABILITY_PENALTY)
        } else {
            reliability
        },
        physics_bias: if otc { PhysicsBias::Synthetic } else { bias },
    }
}
