pub mod sac;

pub use sac::SacPolicy;
