pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// What went wrong, and therefore which exit code the run ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisErrorCategory {
    /// Configuration or event records that cannot be used.
    InputValidationError,
    /// Files that cannot be opened, read or written.
    IoSystemError,
    InternalError,
}

impl AnalysisErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::InternalError => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::InternalError => "InternalError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} [{}] {}", .category.label(), .placeholder, .message)]
pub struct AnalysisError {
    category: AnalysisErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl AnalysisError {
    fn new(
        category: AnalysisErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            AnalysisErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AnalysisErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AnalysisErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> AnalysisErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}
