//! Command-line front end

pub mod commands;

pub use commands::{
    build_demo_block, cmd_demo, cmd_inspect, cmd_params, cmd_validate, load_params,
    validation_report, CliResult, DEV_RANGE_PROOF_NOTE,
};
