pub mod chat;
pub mod onboard;
pub mod serve;
pub mod show;
pub mod status;
