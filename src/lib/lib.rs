pub mod logger;
pub mod net;
pub mod nets;
pub mod threading;
pub mod utils;
