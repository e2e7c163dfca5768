pub mod assets;
pub mod context;
pub mod executor;
pub mod merge;
pub mod parser;
pub mod prompt;
pub mod resolver;
pub mod types;
