pub mod bootstrap;
pub mod connection;
pub mod users;

pub use bootstrap::Bootstrap;
pub use connection::{connect, register_user_schema, Connection, DatabaseError};
pub use users::UserRepository;
