mod delete;
mod insert;
mod select;
mod update;

pub use delete::{Delete, DeleteFrom, DeleteWithWhere};
pub use insert::{Insert, InsertInto, InsertWithValues};
pub use select::{Select, SelectWithColumns, SelectWithTable};
pub use update::{Update, UpdateTable, UpdateWithSet, UpdateWithWhere};
