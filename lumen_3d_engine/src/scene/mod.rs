//! Scene module
//!
//! Hierarchical scene nodes, particle emitters and the units that drive
//! them every frame.

mod kinematics;
mod node;
mod particles;
mod unit;

pub use kinematics::{Kinematics, VecKinematics};
pub use node::{NodeKey, SceneNode};
pub use particles::{Emitter, EmitterBehavior, EmitterKey, Particle, WaterDrop, WaterDropParams};
pub use unit::{Unit, UnitRegistry};
