pub mod audit_logs;
pub mod items;
pub mod reviews;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use items::Entity as Items;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
