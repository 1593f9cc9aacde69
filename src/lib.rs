pub mod blueprint;
pub mod error;
pub mod graph;
pub mod reference;
pub mod schema;
pub mod validate;
pub mod wasm;
