#![allow(dead_code)]

mod mock_system;

pub use mock_system::*;
