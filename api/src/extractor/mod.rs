mod json;
mod valid;

pub use json::Json;
pub use valid::Valid;
