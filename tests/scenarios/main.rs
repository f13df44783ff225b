//! Scenario-based tests for pipedef
//!
//! Each scenario loads a definition, validates it and checks the reported
//! errors or the rendered output.

mod helpers;

mod duplicate_steps;
mod independent_pipelines;
mod missing_vcs_root;
mod render_targets;
mod round_trip;
mod undeclared_roots;
