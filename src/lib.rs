//! Declaration traversal and redefinition checking for a C11 front end.
pub mod source;

/// Contains the diagnostics produced by the traversal.
pub mod diagnostic;
/// Contains the traversal options.
pub mod lang_options;
pub mod name_supply;
/// Contains the declaration traversal.
pub mod semantic;

pub use diagnostic::{CError, ErrorKind, ErrorLevel, RedefKind};
pub use lang_options::{CLanguage, TravOptions};
pub use name_supply::{Name, NameSupply};
pub use source::{NodeInfo, SourceId, SourceSpan};
