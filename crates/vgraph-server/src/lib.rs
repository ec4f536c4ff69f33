//! vgraph Server - JSON over HTTP front end for the graph engine

pub mod api;
