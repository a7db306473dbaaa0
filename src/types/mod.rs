pub mod columns;
pub mod feature;
pub mod frame;
pub mod record;
pub mod station;
