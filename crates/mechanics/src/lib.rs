pub mod friction;
pub mod kinematics;

pub use friction::{FrictionModel, FrictionReport};
pub use kinematics::{TurnKinematics, TurnRadius, max_safe_velocity};
