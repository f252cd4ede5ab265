mod engine_error;
mod timestamp;

pub use engine_error::EngineError;
pub use timestamp::Timestamp;
