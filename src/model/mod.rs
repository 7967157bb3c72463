pub mod credentials;
pub mod date_range;
pub mod work_item;
