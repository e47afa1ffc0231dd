pub mod config;
pub mod error;
pub mod evidence;
pub mod modality;
pub mod report;

pub use config::EngineConfig;
pub use error::*;
pub use evidence::*;
pub use modality::*;
pub use report::*;
