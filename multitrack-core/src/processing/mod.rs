pub mod event_queue;
pub mod timing;
