//! `SeaORM` entity definitions.

pub mod prelude;

pub mod budget_files;
pub mod budget_items;
pub mod sea_orm_active_enums;
pub mod users;
