//! Process exit codes.

pub const SUCCESS: i32 = 0;
pub const RUN_FAILED: i32 = 1; // The run started but could not complete
pub const CONFIG_ERROR: i32 = 2; // Bad arguments, config.yml or test query file
