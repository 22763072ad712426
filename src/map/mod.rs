pub mod draw;
pub mod view;
