pub mod db;
pub mod error;
pub mod ledger;

pub use error::CreditError;
pub use ledger::{CreditGate, SqliteLedger};
