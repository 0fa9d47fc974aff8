pub mod crop;
pub mod scan;
pub mod soil;

pub use crop::*;
pub use scan::*;
pub use soil::*;
