use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `zos-lens`.
///
/// Each subsystem defines its own error enum. Library callers match on these
/// to decide recovery strategy; config loading, the secret store and bus
/// implementations use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum LensError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Session ─────────────────────────────────────────────────────────
    #[error("session: {0}")]
    Session(#[from] SessionError),

    // ── RMB request / response ──────────────────────────────────────────
    #[error("rmb: {0}")]
    Rmb(#[from] RmbError),

    // ── Privilege-gated calls ───────────────────────────────────────────
    #[error(
        "unauthorized: {operation} requires admin privileges on the target node. \
         The twin behind your secret phrase is not allowed to call the node's debug API."
    )]
    Unauthorized { operation: String },

    // ── Grid directory ──────────────────────────────────────────────────
    #[error("directory: {0}")]
    Directory(#[from] DirectoryError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LensError {
    /// True for the errors the caller must fix locally before retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a secret phrase is required to initialize the RMB client")]
    MissingMnemonic,

    #[error("{operation}: no secret phrase configured")]
    MissingIdentity { operation: String },

    #[error("{operation}: no node selected")]
    MissingTarget { operation: String },

    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Session errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(
        "mnemonic validation failed: the phrase is not valid according to BIP39. Please check:\n\
         - correct number of words (12 or 24)\n\
         - no typos in words\n\
         - words are from the BIP39 wordlist\n\
         - no extra spaces or special characters"
    )]
    InvalidMnemonic,

    #[error(
        "no twin found: your account doesn't exist on the {network} network. Please:\n\
         - verify you're on the correct network\n\
         - ensure your account has been activated on this network\n\
         - try a different network if needed"
    )]
    NoTwinFound { network: String },

    #[error("network connection failed: {message}\nplease check your internet connection and try again")]
    NetworkUnreachable { message: String },

    #[error("connect failed: {message}")]
    Connect { message: String },

    #[error("RMB client is not initialized or connected")]
    NotConnected,
}

// ─── RMB errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RmbError {
    #[error("request failed for command \"{command}\" to twin {destination}: {cause}")]
    RequestFailed {
        command: String,
        destination: u32,
        cause: String,
    },

    #[error("invalid response to \"{command}\": {reason}")]
    InvalidResponse { command: String, reason: String },
}

// ─── Grid directory errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("gridproxy returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode gridproxy response: {0}")]
    Decode(String),
}

// ─── Message heuristics ─────────────────────────────────────────────────────

/// Whether a failure message reads like a privilege rejection from the node.
///
/// The bus carries no structured status for this, so the text is the only
/// signal available.
pub fn is_unauthorized(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("unauthorized")
        || lower.contains("permission denied")
        || lower.contains("forbidden")
}

/// Map the text of a failed `connect` into a session error.
pub fn classify_connect_error(message: &str, network: &str) -> SessionError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("invalid") && lower.contains("mnemonic") {
        SessionError::InvalidMnemonic
    } else if lower.contains("twin") || lower.contains("user") {
        SessionError::NoTwinFound {
            network: network.to_string(),
        }
    } else if lower.contains("connect") || lower.contains("network") {
        SessionError::NetworkUnreachable {
            message: message.to_string(),
        }
    } else {
        SessionError::Connect {
            message: message.to_string(),
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, LensError>;
