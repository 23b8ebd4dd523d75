//! Structural elements module

mod beam;
mod material;
mod node;
mod section;
mod support;

pub use beam::{local_mass, local_stiffness, transformation, BeamElement, Mat6};
pub use material::Material;
pub use node::Node;
pub use section::Section;
pub use support::{SpringSupport, Support};
