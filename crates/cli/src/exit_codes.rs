//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                                 |
//! |------|---------------------------------------------------------|
//! | 0    | Success                                                 |
//! | 1    | General error (unspecified)                             |
//! | 2    | CLI usage error (bad args, unknown window)              |
//! | 3    | Input table is missing a required column                |
//! | 4    | Quantity is not a number (or negative when rejected)    |
//! | 5    | Duplicate product in the inventory table                |
//! | 6    | Invalid config file                                     |
//! | 7    | Low stock found and `--fail-on-low-stock` was given     |
//! | 8    | IO error (cannot read input, cannot write output)       |
//! | 9    | Malformed CSV                                           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError::from(ReconError)` or the relevant command

use stockcheck_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A required column is missing from the inventory or sales table.
pub const EXIT_SCHEMA: u8 = 3;

/// A quantity cell could not be used as a number.
pub const EXIT_TYPE_CONVERSION: u8 = 4;

/// Two inventory rows normalize to the same product under `duplicates = "error"`.
pub const EXIT_DUPLICATE: u8 = 5;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 6;

/// At least one product is low on stock (only with `--fail-on-low-stock`).
pub const EXIT_LOW_STOCK: u8 = 7;

/// File could not be read or written.
pub const EXIT_IO: u8 = 8;

/// Input is not well-formed CSV.
pub const EXIT_CSV: u8 = 9;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Schema { .. } => EXIT_SCHEMA,
        ReconError::TypeConversion { .. } => EXIT_TYPE_CONVERSION,
        ReconError::DuplicateKey(_) => EXIT_DUPLICATE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Csv { .. } => EXIT_CSV,
    }
}
