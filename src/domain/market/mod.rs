pub mod broker_profile;
pub mod indicator_advisor;
pub mod observation;
pub mod physics;
pub mod sessions;
pub mod symbol;
pub mod timeframe;

pub use observation::ObservationPoint;
pub use physics::{MomentumDirection, PhysicsDescriptor, compute_physics};
pub use symbol::MarketType;
pub use timeframe::Timeframe;
