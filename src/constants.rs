pub const MESSAGE_INVALID_TOKEN: &str = "Invalid token, please login again";
pub const MESSAGE_WELCOME: &str = "Welcome! The banking API";

// Labels written into `accounts.bank_name`.
pub const DEFAULT_BANK_NAME: &str = "PxB";
pub const TRANSFER_BANK_NAME: &str = "PxB";
pub const DEPOSIT_BANK_NAME: &str = "VeeGil Bank";

pub const FIFTEEN_MINUTES: i64 = 900;
