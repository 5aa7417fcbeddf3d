//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `nftcheck` exit codes.
//! Exit codes are part of the shell contract: cron jobs and alerting
//! wrappers rely on them. Discrepancies are reported on stdout and are
//! never an error.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success (with or without discrepancies)  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad config)   |
//! | 3-9     | recon            | Payload normalization codes              |
//! | 50-59   | fetch            | Vendor API connectors                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant error mapping

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - both pairwise reports were printed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid configuration.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Recon (3-9)
// =============================================================================

/// A vendor record could not be normalized: unparsable number or a
/// required field missing.
pub const EXIT_PARSE_ERROR: u8 = 4;

// =============================================================================
// Fetch (50-59): vendor API connectors
// =============================================================================

/// Auth rejected by upstream (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Bad request rejected by upstream (400).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Rate limited after retries (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), network failure or timeout after retries, or a
/// malformed response body.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_PARSE_ERROR,
            EXIT_FETCH_AUTH,
            EXIT_FETCH_VALIDATION,
            EXIT_FETCH_RATE_LIMIT,
            EXIT_FETCH_UPSTREAM,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
