//! # Ledger-Families Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── commit_flows.rs   # client → in-process node → commit
//!     ├── http_flows.rs     # client → HTTP → node
//!     └── agreement.rs      # client and node validation agree
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lf-tests
//! cargo test -p lf-tests integration::http_flows
//! ```

pub mod integration;
