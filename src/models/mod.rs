pub mod black_scholes;
pub mod normal;
pub mod surface;

pub use black_scholes::{evaluate, MarketParameters, PricingResult};
pub use surface::{sample_surface, Sensitivity, SurfaceGrid};
