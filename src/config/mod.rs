//! Configuration management module
//!
//! Compiled defaults, the environment layer, and the resolver that merges them
//! with persisted user overrides.

pub mod env;
pub mod resolver;
pub mod settings;

pub use env::{AppEnv, Environment};
pub use resolver::{ConfigResolver, SettingKey};
pub use settings::{ApiConfig, EffectiveConfig, Feature, FeatureConfig, FeatureFlags, UiConfig};
