// Hashing and block matching for the coarse delta pass.
//
// This module provides:
// - Weak (Adler-32) and strong (SHA-256) block hashes
// - A rolling form of the weak hash for the target scan
// - The block index over the base buffer
// - The coarse block matcher that emits the initial command list

pub mod checksum;
pub mod config;
pub mod matching;
pub mod rolling;
pub mod table;
