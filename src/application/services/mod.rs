//! Engine services.

pub mod hit_counter;
pub mod mapping_resolver;

pub use hit_counter::{HitCounter, HitLimitPolicy, HitOutcome};
pub use mapping_resolver::{
    CreateMapping, CreatedMapping, DEFAULT_MAX_GENERATION_ATTEMPTS, MappingResolver, Resolution,
    ResolverSettings,
};
