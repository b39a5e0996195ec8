//! Entity module - `SeaORM` entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod setting;

pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel};
