mod session;

pub use session::SessionParam;
