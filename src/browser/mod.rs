pub mod connection;
pub mod launch;
pub mod session;

pub use connection::connect_to_browser;
pub use launch::{launch_browser, BrowserProcess};
pub use session::{authenticate, SessionManager};
