//! Drop-in replacements for axum extractors with JSON rejections.

mod enhanced_json;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::validated_json::ValidateJson;
