pub mod account;
pub use self::account::delete_account;

pub mod health;
pub use self::health::health;
