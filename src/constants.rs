// UI Constants
pub const USER_LABEL: &str = "You";
pub const BOT_LABEL: &str = "AI";

pub const PLACEHOLDER_REPLY: &str = "Composing a response...";
pub const ERROR_REPLY: &str = "Something went wrong while reaching the HealthMed service.";
pub const THINKING_STATUS: &str = "Waiting for HealthMed...";

// API Constants
pub const DEFAULT_API_URL: &str = "https://healthmed-api-nlp.onrender.com";
pub const ASK_PATH: &str = "/ask";
