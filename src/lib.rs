pub mod catalog;
pub mod channel;
pub mod entity;
pub mod error;
pub mod message;
pub mod session;
pub mod state;
pub mod synth;
pub mod wizard;

pub use catalog::CatalogReader;
pub use entity::{DbType, Entity, EntityKind};
pub use error::{Error, Result};
pub use message::{Request, Response};
pub use session::Session;
pub use synth::ConfigSynthesizer;
