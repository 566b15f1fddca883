mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use self::types::AuthCtx;
