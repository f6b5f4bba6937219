//! Run scheduling
//!
//! Each invocation probes a single category chosen by a deterministic daily
//! rotation, so a catalog of `N` categories is fully covered every `N` days.
//!
//! # Modules
//!
//! - [`rotation`] - Day-of-year category rotation
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use livecheck::catalog::parse_catalog;
//! use livecheck::scheduler::RotationSelector;
//!
//! let catalog = parse_catalog("News,#genre#\nCNN,http://a\n");
//! let selector = RotationSelector::for_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
//! assert_eq!(selector.select(&catalog).unwrap().id, "News");
//! ```

pub mod rotation;

pub use rotation::{select_for_day, RotationSelector};
