//! Library to calculate difficulty and performance attributes for 2D
//! target-tapping rhythm beatmaps.
//!
//! ## Description
//!
//! A beatmap is preprocessed into a sequence of difficulty objects carrying
//! distance, angle, and timing features. A family of skills consumes that
//! sequence in a single forward pass, each accumulating strain with
//! exponential time decay into a generalized power mean. The aggregated
//! skill values combine into a star rating along with difficulty curves
//! over combo and miss count, which a performance calculation then
//! interpolates against an actual play result.
//!
//! ## Usage
//!
//! ```
//! use stardiff::{Beatmap, Difficulty, Performance};
//!
//! # fn example() -> std::io::Result<()> {
//! // Decode the map
//! let map = Beatmap::from_path("./resources/1980365.osu")?;
//!
//! // Calculate difficulty attributes
//! let diff_attrs = Difficulty::new()
//!     .mods(8 + 16) // HDHR
//!     .calculate(&map);
//!
//! let stars = diff_attrs.stars;
//!
//! // Calculate performance attributes
//! let perf_attrs = Performance::from_attributes(diff_attrs)
//!     .mods(8 + 16) // HDHR, same as before
//!     .combo(789)
//!     .accuracy(99.2)
//!     .misses(2)
//!     .calculate();
//!
//! let pp = perf_attrs.pp;
//!
//! println!("Stars: {stars} | PP: {pp}");
//! # Ok(()) }
//! ```
//!
//! Both calculations are pure functions of the map, the mods, and the clock
//! rate; repeated runs yield identical results. Each calculation owns its
//! state exclusively, so batches of maps or scores parallelize without any
//! synchronization.

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::missing_const_for_fn, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::match_same_arms,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::explicit_iter_loop,
    clippy::similar_names,
    clippy::cast_possible_wrap
)]

#[doc(inline)]
pub use self::{
    attributes::{DifficultyAttributes, PerformanceAttributes},
    difficulty::{Difficulty, Strains},
    model::{beatmap::Beatmap, mods::GameMods},
    performance::{Performance, ScoreState},
};

/// Difficulty and performance attribute types.
pub mod attributes;

/// Difficulty calculation.
pub mod difficulty;

/// Types used in and around this crate.
pub mod model;

/// Performance calculation.
pub mod performance;

mod convert;
mod object;
mod util;
