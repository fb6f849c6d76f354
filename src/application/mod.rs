pub mod booking_form;
pub mod booking_widget;
pub mod bootstrap;
