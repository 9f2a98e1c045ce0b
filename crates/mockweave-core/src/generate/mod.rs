pub mod engine;
pub mod foreign_key;
pub mod options;
pub mod pipeline;
pub mod preset;
pub mod providers;
pub mod resolver;
pub mod unique;
pub mod value;
