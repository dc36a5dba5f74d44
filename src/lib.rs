//! Core entry point for the character_sheet crate.
//!
//! Sheets come from a remote generator ([`client`]), are tracked by a
//! [`controller::SheetController`], laid out by [`layout::render`] and can be
//! exported to PDF through [`export::SheetExporter`].

pub mod client;
pub mod config;
pub mod controller;
pub mod elements;
pub mod export;
pub mod fonts;
pub mod icons;
pub mod layout;
pub mod model;

pub use client::{FetchError, GeneratorClient, SheetSource};
pub use config::GeneratorConfig;
pub use controller::{GenerateOutcome, SheetController, ViewState};
pub use export::{export_filename, ExportError, ExportSettings, SheetExporter};
pub use layout::SheetLayout;
pub use model::{Attribute, CharacterSheet, SavingThrow};
