//! Tag wrapping and auto-closing on top of a rope-backed document.
//!
//! [`wrap`] turns a phrase at a caret or selection into `<phrase></phrase>`.
//! [`auto_close`] watches edits and inserts `</name>` once `<name>` has been
//! typed. [`session::TagSession`] wires both to a [`document::Document`].

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod auto_close;
pub mod config;
pub mod document;
pub mod eligibility;
pub mod idle;
pub mod insert;
pub mod position;
pub mod scope;
pub mod selection;
pub mod session;
pub mod transaction;
pub mod wrap;

pub type Tendril = SmartString<LazyCompact>;
