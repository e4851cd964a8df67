/// Database models
///
/// Each model owns its table's query operations:
///
/// - [`user`]: User accounts and public user views
/// - [`todo`]: Todos, their kanban status, and assignee links

pub mod todo;
pub mod user;
