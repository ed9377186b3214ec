pub mod advisory;
pub mod db;
pub mod energy;
pub mod format;
pub mod repository;
pub mod sensor;
pub mod session;
pub mod threshold;
pub mod window;
