//! Homebrew tap updating for tapbump.
//!
//! This crate patches a formula or cask in a Homebrew tap to a new release
//! and publishes the change, either as a direct commit or through a pull
//! request.
//!
//! # Example
//!
//! ```rust,ignore
//! use tapbump_homebrew::{PackageType, TapRef, UpdateConfig, Updater};
//!
//! let config = UpdateConfig::new(TapRef::parse("octo/tap")?, "foo", PackageType::Formula)
//!     .with_version("1.2.3")
//!     .with_url("https://foo.dev/foo-{{version}}.tar.gz");
//!
//! let outcome = Updater::new(config, &host, &hasher).run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

mod config;
mod message;
mod package;
mod tap;
mod updater;

pub use config::UpdateConfig;
pub use message::{DEFAULT_MESSAGE, format_message};
pub use package::{Package, PackageType};
pub use tap::{
    PublishOptions, PublishOutcome, PublishTarget, Strategy, TAP_REPO_PREFIX, Tap, TapRef,
    split_message,
};
pub use updater::{UpdateOutcome, Updater};
