//! Statistical utilities shared by the game-log analysis tools.
//!
//! This crate provides:
//!
//! - **Descriptive statistics**: mean, median, mode, population and sample standard deviation
//! - **Percentiles**: nearest-rank percentile lookup for report tables
//! - **Rounding**: fixed-precision rounding used when values are written to output tables
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`round`]: Fixed decimal precision rounding
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use rugs_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 2.5);
//! assert_eq!(stats.median, 2.5);
//! ```
//!
//! ## Sample standard deviation of a short window
//!
//! ```
//! use rugs_stats::descriptive;
//!
//! assert_eq!(descriptive::sample_std_dev(&[1.0]), None);
//! assert_eq!(descriptive::sample_std_dev(&[2.0, 4.0]), Some(2.0_f64.sqrt()));
//! ```
//!
//! ## Rounding for presentation
//!
//! ```
//! use rugs_stats::round::round_to;
//!
//! assert_eq!(round_to(1.234_567_89, 4), 1.2346);
//! ```

pub mod descriptive;
pub mod percentiles;
pub mod round;
