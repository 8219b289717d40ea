//! Shared constants used across VaultPaste crates.

/// Default base URL of the snippet service.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Page path that renders a single snippet; share links point here.
pub const DEFAULT_VIEW_PATH: &str = "/view.html";

/// Expiry applied by the service when a create request carries none (minutes).
pub const DEFAULT_EXPIRY_MINUTES: u32 = 360;

/// Default request timeout for API calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How long the "Copied!" acknowledgement stays visible.
pub const DEFAULT_COPY_FEEDBACK_MS: u64 = 2_000;

/// Preference key holding the persisted theme.
pub const THEME_KEY: &str = "theme";

/// MIME type of downloaded snippet files.
pub const DOWNLOAD_MIME: &str = "text/plain";

/// Servlet session cookie the service issues after form login.
pub const SESSION_COOKIE_NAME: &str = "JSESSIONID";
