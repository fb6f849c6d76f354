pub mod dialog;
pub mod events;
pub mod scroll_lock;
pub mod select;
