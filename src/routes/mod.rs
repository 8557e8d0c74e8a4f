pub mod screen;
pub mod slots;
pub mod state;
pub mod training;
pub mod util;
