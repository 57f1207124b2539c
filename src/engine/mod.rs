pub mod broadcast;
pub mod dispatch;
