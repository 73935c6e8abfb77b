//! CLI command implementations.
//!
//! The binary has a single command: read timestamped lines, decide which to
//! keep, print them.
//!
//! # Modes
//!
//! | Mode | Input order | Memory | Output order |
//! |------|-------------|--------|--------------|
//! | streaming (default) | newest first, checked | total capacity | input order |
//! | batch (`--sort`) | any | whole input | newest first |
//!
//! # Example Usage
//!
//! ```bash
//! # Keep one backup per day for a week and one per month for a year
//! ls -r /srv/backups | datesieve --days 7 --months 12
//!
//! # Print what would be deleted, from unsorted input
//! find /srv/backups -name '*.tar' | datesieve --sort --invert --days 7 | xargs rm
//!
//! # Strict parsing
//! datesieve --strptime '%Y-%m-%dT%H:%M:%SUTC' --weeks 8 < snapshots.txt
//! ```

mod sieve;

pub use sieve::SieveCommand;
