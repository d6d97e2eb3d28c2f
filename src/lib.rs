pub mod core;
pub mod io;
pub mod logging;
pub mod remote;
