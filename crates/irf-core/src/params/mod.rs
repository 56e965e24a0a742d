//! IRAF-style `.par` parameter groups and the search-path store that locates them.
//!
//! A parameter file carries one `name,type,mode,value,min,max,prompt` line per
//! parameter, with `#` comments interspersed. [`ParGroup`] parses and writes the
//! format with comments preserved in place; [`ParameterStore`] resolves groups by
//! application name along an explicit search path (typically the PFILES
//! environment variable) instead of a globally registered application store.

pub mod group;
pub mod store;

pub use group::{ParGroup, ParType, ParValue, Parameter, ParError};
pub use store::{Application, ParameterStore};
