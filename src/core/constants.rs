//! Shared constants used across the application

/// Endpoint used when neither the config file nor a flag names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/chat";

pub const DEFAULT_TITLE: &str = "AI Agents System";

/// Assistant text substituted for any failed exchange.
pub const APOLOGY_MESSAGE: &str = "Sorry, an error occurred. Please try again.";

/// Shown in place of the chat surface once rendering has faulted.
pub const RENDER_FALLBACK_MESSAGE: &str = "Something went wrong. Please restart the application.";

pub const INPUT_PLACEHOLDER: &str = "Type your message here...";
