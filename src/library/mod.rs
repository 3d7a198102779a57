//! The library database used throughout the CRUD exercises: categories,
//! members (`utilisateurs`), books (`livres`) and loans (`emprunts`).
//!
//! Every operation takes the `DataStore` it runs on. The schema itself is
//! owned by the database; nothing here creates or migrates it.

pub mod books;
pub mod loans;
pub mod reports;
pub mod schema;
pub mod users;

pub use books::NewBook;
pub use reports::Reports;
pub use schema::{BookColumns, Books, Categories, CategoryColumns, LoanColumns, Loans, UserColumns, Users};
pub use users::NewUser;
