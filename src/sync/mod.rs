pub mod debounce;
pub mod remote;
pub mod resolve;
pub mod session;
