use std::fmt;

/// Stable (name, numeric code) pair identifying a failing operation
/// category. The name keys user-facing message lookup; the code is for
/// diagnostics. The pairs must never change value once shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    name: &'static str,
    code: u16,
}

impl ErrorCode {
    pub const SERVER: ErrorCode = ErrorCode::new("error.host", 1000);

    pub const ARCHIVE_FETCH: ErrorCode = ErrorCode::new("error.list", 2000);
    pub const ARCHIVE_EXTRACT: ErrorCode = ErrorCode::new("error.extract", 2002);
    pub const ARCHIVE_PAGE_FETCH: ErrorCode = ErrorCode::new("error.load.page", 2003);
    pub const ARCHIVE_METADATA_UPDATE: ErrorCode = ErrorCode::new("error.update.metadata", 2004);

    pub const CATEGORY_FETCH: ErrorCode = ErrorCode::new("error.category", 3000);
    pub const CATEGORY_UPDATE: ErrorCode = ErrorCode::new("error.category.update", 3001);

    const fn new(name: &'static str, code: u16) -> Self {
        Self { name, code }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn code(&self) -> u16 {
        self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
