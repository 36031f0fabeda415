use std::env;

/// Fixed portal selectors and timings. The core depends on these but does
/// not define them; the portal layout owns their meaning.
pub mod portal {
    /// Login page, with the post-login return URL baked in.
    pub const LOGIN_URL: &str = "https://sol.lideraviacao.com.br/Login?expired=True&returnurl=https%3A%2F%2Fsol.lideraviacao.com.br%2FAcompanhamentoCliente%2FAcompanhamentoCliente";

    /// Substring that identifies the login page in a URL. Post-submit, a
    /// URL still containing this marker means the portal bounced us back.
    pub const LOGIN_MARKER: &str = "Login";

    pub const USERNAME_FIELD: &str = "User";
    pub const PASSWORD_FIELD: &str = "Password";

    /// First submit-typed button on the page.
    pub const SUBMIT_BUTTON_XPATH: &str = "//button[@type='submit']";

    /// DOM id of the result table on the tracking page.
    pub const TABLE_ID: &str = "tbGridAcompanhamento";

    /// Bounded wait for element lookups.
    pub const ELEMENT_TIMEOUT_SECS: u64 = 10;

    /// Fixed settle interval after submitting the login form. No polling;
    /// the portal finishes its client-side redirect within this window.
    pub const SETTLE_INTERVAL_SECS: u64 = 3;
}

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Port the HTTP server listens on. `PORT` env var, falling back to 8000.
pub fn server_port() -> u16 {
    match env::var("PORT") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("invalid PORT value '{}', using {}", value, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}

/// WebDriver endpoint of the externally managed chromedriver.
pub fn webdriver_url() -> String {
    env::var("WEBDRIVER_URL").unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string())
}
