pub mod assets;
pub mod block;
pub mod builder;
pub mod collect;
pub mod config;
pub mod discover;
pub mod layout;
pub mod log;
pub mod model;
pub mod pages;
pub mod preprocess;
pub mod render;
pub mod syntax_highlight;
