//! # NFT Picker Simulation
//!
//! Runs picker sessions end to end against the in-memory services from
//! `nft-picker-core`, driven by JSON fixtures.
//!
//! ## Architecture
//!
//! - **Fixture** (`fixture.rs`): What each service serves and what the user does
//! - **Scenarios** (`scenarios.rs`): Mounts a session and plays the fixture
//! - **Report** (`report.rs`): Catalog, visible subset, selection and form values
//!
//! ## Example
//!
//! ```rust,ignore
//! use nft_picker_simulation::{Fixture, run_fixture};
//!
//! let fixture = Fixture::load(Path::new("fixtures/demo.json"))?;
//! let report = run_fixture(&fixture).await?;
//! println!("{}", report.render());
//! ```

pub mod fixture;
pub mod report;
pub mod scenarios;

pub use fixture::{Fixture, MetadataEntry, UserActions, VaultEntry, WalletEntry};
pub use report::{LoadSnapshot, Report};
pub use scenarios::{DEMO_FIXTURE, demo_fixture, run_fixture};
