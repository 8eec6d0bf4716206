pub mod controller;
pub mod graph;
pub mod monitor;
pub mod orientation;
pub mod permission;
pub mod resolver;
pub mod restart;
