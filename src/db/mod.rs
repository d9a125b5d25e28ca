mod folders;
mod leaves;
mod schema;

pub use schema::Database;
