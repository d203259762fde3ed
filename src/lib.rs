// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod config;
pub mod diagram;
pub mod inspect;
pub mod logging;
pub mod markup;
pub mod render;
pub mod schema;
