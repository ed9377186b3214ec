mod device;
mod metric;
mod reading;

pub use device::*;
pub use metric::*;
pub use reading::*;
