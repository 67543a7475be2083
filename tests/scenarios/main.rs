//! Scenario-based tests for pipeline-gen

mod helpers;
mod optional;
mod overrides;
