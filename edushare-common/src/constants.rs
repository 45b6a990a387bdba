//! Constants used across EduShare.

/// Keys of the durable session storage.
pub mod storage_keys {
    /// Raw bearer token.
    pub const AUTH_TOKEN: &str = "authToken";
    /// JSON snapshot of the signed-in user.
    pub const CURRENT_USER: &str = "currentUser";
    /// `"true"` when the user asked to stay signed in.
    pub const REMEMBER_ME: &str = "rememberMe";
}

/// Limits applied to file uploads before anything is sent.
pub mod upload {
    /// Largest accepted file, 50 MiB.
    pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
    /// Accepted file extensions, lowercase and without the dot.
    pub const ALLOWED_EXTENSIONS: &[&str] = &[
        "pdf", "docx", "txt", "jpg", "jpeg", "png", "gif", "mp4", "avi", "mov",
    ];
}

/// Length limits for user supplied text.
pub mod limits {
    /// Minimum password length.
    pub const PASSWORD_MIN_LEN: usize = 8;
    /// Maximum comment length, in characters.
    pub const COMMENT_MAX_LEN: usize = 1000;
    /// Maximum collection name length, in characters.
    pub const COLLECTION_NAME_MAX_LEN: usize = 100;
    /// Maximum collection description length, in characters.
    pub const COLLECTION_DESCRIPTION_MAX_LEN: usize = 500;
}
