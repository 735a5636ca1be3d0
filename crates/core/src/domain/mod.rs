pub mod category;
pub mod content;
pub mod dates;
pub mod records;
pub mod setting;
pub mod stock;
