/// C dialects a traversal can be configured for.
///
/// The dialect is recorded for consumers; the declaration checks themselves
/// don't depend on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CLanguage {
    C89,
    #[default]
    C99,
    GNU89,
    GNU99,
}

impl From<&str> for CLanguage {
    fn from(s: &str) -> Self {
        match s {
            "c89" | "c90" => CLanguage::C89,
            "c99" => CLanguage::C99,
            "gnu89" | "gnu90" => CLanguage::GNU89,
            "gnu99" => CLanguage::GNU99,
            _ => CLanguage::C99, // default to C99
        }
    }
}

impl CLanguage {
    pub fn is_gnu(self) -> bool {
        matches!(self, CLanguage::GNU89 | CLanguage::GNU99)
    }
}

/// Options affecting a traversal run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TravOptions {
    pub language: CLanguage,
    /// `warn` keeps the original severity instead of demoting it (-Werror).
    pub warnings_as_errors: bool,
}

impl TravOptions {
    pub fn new(language: CLanguage) -> Self {
        TravOptions {
            language,
            warnings_as_errors: false,
        }
    }

    /// Build options from `-W` style flags, e.g. `["error"]`.
    pub fn from_warnings(warnings: &[String]) -> Self {
        TravOptions {
            language: CLanguage::default(),
            warnings_as_errors: warnings.iter().any(|w| w == "error"),
        }
    }
}
