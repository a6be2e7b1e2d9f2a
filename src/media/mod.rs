pub mod extract;
pub mod resync;
