//! Form validation and submission for the course registration portal.
//!
//! A form is a [`form::FormState`] checked against a [`schema::Schema`]. On
//! submit its validated values feed a [`chain::Chain`] of dependent requests
//! run by the [`orchestrator::Orchestrator`], which moves the form's status in
//! the shared [`status::StatusStore`]. A [`navigation::NavigationEffect`]
//! watches that status and changes route once the chain succeeds.

pub mod api;
pub mod app;
pub mod chain;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod history;
pub mod navigation;
pub mod orchestrator;
pub mod schema;
pub mod screens;
pub mod status;
pub mod utils;
