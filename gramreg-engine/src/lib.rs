//! Access to the external grammar engine
//!
//!     The grammar engine (`xmlgenerator`) is an opaque program. It generates sentences from a
//!     grammar and parses sentence files back into XML parse results. This crate models it as a
//!     set of capabilities so the rest of the toolchain can run against a fake in tests:
//!
//!     - SentenceGenerator: grammar + count -> raw generator output
//!     - GrammarParser: grammar + sentence file -> raw parser output (concatenated XML)
//!     - EnvironmentSwitcher: select which engine installation is active
//!
//!     ProcessEngine implements all three by spawning the engine program. Raw output is returned
//!     untouched; sanitizing and splitting it is gramreg-core's job.
//!
//! Failures
//!
//!     A nonzero exit is classified into a [`Fault`] by looking at what the engine printed. The
//!     engine has no structured error channel, so the buckets are recognized by known substrings.
//!     A generation run that exceeds its time budget is a distinct [`EngineError::Timeout`].

pub mod capability;
pub mod error;
pub mod fault;
pub mod process;

pub use capability::{EnvironmentSwitcher, GrammarEngine, GrammarParser, SentenceGenerator, Stage};
pub use error::{EngineError, Result};
pub use fault::Fault;
pub use process::{EngineSettings, ProcessEngine};
