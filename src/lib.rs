//! *A small command line argument parser built around declared argument slots.*
//!
//! Arguments are declared at runtime on an [`ArgParser`], each holding
//! `String`, `i32` or `bool` values, optionally with a short alias, a default,
//! multi-value or positional binding. A parse resolves the tokens into those
//! slots, and values are then read back by name.
//!
//! ```
//! use argslot::ArgParser;
//!
//! let mut parser = ArgParser::new("wc");
//! parser.add_help(('h', "help"), "Count lines in files.")?;
//! parser.add_flag(('l', "lines"), "Print line counts")?;
//! parser.add_int_argument("limit", "Stop after this many files")?.default_value(10);
//! parser.add_string_argument("file", "Input files")?.multi_value(1).positional();
//!
//! parser.parse_from(["wc", "-l", "a.txt", "b.txt"])?;
//! assert!(parser.get_flag("lines")?);
//! assert_eq!(parser.get_int_value("limit")?, 10);
//! assert_eq!(parser.values::<String>("file")?, ["a.txt", "b.txt"]);
//! # Ok::<(), argslot::Error>(())
//! ```
//!
//! Parsing reports the first failure as an [`Error`], while every argument
//! keeps its own [`ErrorStatus`]. Rejected tokens and other diagnostics are
//! also emitted as [`tracing`] events.
#![forbid(unsafe_code)]

mod argument;
mod error;
mod parser;
mod runtime;
mod slot;
mod values;

#[cfg(feature = "help")]
mod help;

pub use crate::argument::{Argument, ArgumentMetadata};
pub use crate::error::{Error, ErrorKind, ErrorStatus};
pub use crate::parser::{ArgNames, ArgParser};
pub use crate::slot::Slot;
pub use crate::values::{ArgValue, Value};

pub type Result<T, E = Error> = std::result::Result<T, E>;
