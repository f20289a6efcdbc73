//! # Macro System
//!
//! Definitions are captured from `NAME MACRO params ... MEND` blocks during the forward
//! scan and stored in a [`MacroTable`]. A call line naming a stored macro creates an
//! [`ExpansionFrame`]: a private copy of the definition's parameters and labels, bound to
//! the call's arguments and given fresh label ordinals.
//!
//! ## Core Principles
//!
//! - **Textual only**: substitution works on whole words of the line text; macros know
//!   nothing about the instructions they expand to.
//! - **First definition wins**: a second definition of a name is skipped, never an error.
//! - **No recursion**: a call naming any macro already being expanded is fatal.
//! - **Unique labels**: every internal label of every expansion gets its own ordinal from a
//!   single run-wide [`LabelCounter`].

pub mod expander;
pub mod registry;
pub mod substitute;
pub mod types;

pub use expander::{instantiate, CallSite};
pub use registry::MacroTable;
pub use substitute::replace_whole_word;
pub use types::{
    Binding, ExpansionFrame, ExpansionStep, FormalParam, LabelCounter, LabelMap, LabelSlot,
    MacroDefinition,
};
