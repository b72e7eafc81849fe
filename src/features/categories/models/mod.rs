mod category;

pub use category::{Category, FALLBACK_LANGUAGE};
