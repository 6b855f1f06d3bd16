pub mod sea_orm_active_enums;
pub mod tournaments;
pub mod users;
