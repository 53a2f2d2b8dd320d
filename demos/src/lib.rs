//! Shared pieces of the Agentry demos
//!
//! Each binary under `src/bin` reproduces one demo. Anything more than a
//! few lines of wiring lives here so it can be unit tested.

pub mod airline;
pub mod analysis;
pub mod cli;
pub mod doc_qa;
pub mod email;
pub mod genai;
pub mod memory;
pub mod weather;
