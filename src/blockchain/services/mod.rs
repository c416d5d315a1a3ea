// src/blockchain/services/mod.rs

pub mod abi;
pub mod names;
