//! Reader and writer for sourmash signature files.
//!
//! A signature file is a JSON array of records. Each record carries a
//! `signatures` array of sketches, and each sketch carries its k-mer size,
//! scaling bound and the sorted list of hash values in `mins`:
//!
//! ```text
//! [{
//!   "class": "sourmash_signature",
//!   "name": "sample",
//!   "signatures": [
//!     {"ksize": 31, "max_hash": 18446744073709551, "mins": [12, 907, ...], "md5sum": "..."}
//!   ],
//!   "version": 0.4
//! }]
//! ```
//!
//! Gzip-compressed files are detected by their magic number and decoded
//! transparently.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sig_cleaner::parsing::sourmash::parse_hashes;
//! use std::path::Path;
//!
//! let hashes = parse_hashes(Path::new("sample.sig"), 31).unwrap();
//! println!("{} hashes", hashes.len());
//! ```

pub mod sourmash;

pub use sourmash::ParseError;
