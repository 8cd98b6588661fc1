pub mod bot;
pub mod creator;
pub mod http;
pub mod session;
