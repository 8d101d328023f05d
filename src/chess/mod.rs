//! Implementation of chess environment, its rules and specifics.

pub mod bitboard;
pub mod board;
pub mod core;
pub mod fen;
pub mod moves;
pub mod perft;
pub mod piece;
pub mod player;
pub mod tile;
