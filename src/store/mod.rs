pub mod ledger;
pub mod schema;
pub mod schema_gen;

pub use ledger::*;
pub use schema::*;
