pub mod pr_model;

pub use pr_model::{PrCircle, PrLink, PrModel, PrParticle};
