use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Content must not be empty")]
    #[diagnostic(help("내용을 입력해주세요."))]
    EmptyBody,

    #[error("Nickname is longer than {max} characters")]
    NicknameTooLong { max: usize },

    #[error("Unknown role: {0}")]
    InvalidRole(String),

    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Post #{0} not found")]
    PostNotFound(i64),

    #[error("No post with share code {0}")]
    ShareCodeNotFound(String),

    #[error("Phrase list error: {0}")]
    #[diagnostic(help(
        "a phrase file is json with a \"version\" string and a \"phrases\" array holding at least one non-blank phrase"
    ))]
    Phrases(String),

    #[error("Username and password must not be empty")]
    EmptyCredentials,

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Errors caused by what the user typed rather than by the system.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyBody
                | Error::NicknameTooLong { .. }
                | Error::InvalidRole(_)
                | Error::InvalidCategory(_)
                | Error::BadRequest(_)
                | Error::EmptyCredentials
        )
    }
}
