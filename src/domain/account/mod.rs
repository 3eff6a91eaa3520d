//! Account domain - per-user bookkeeping on top of pools

mod user_account;

pub use user_account::UserAccount;
