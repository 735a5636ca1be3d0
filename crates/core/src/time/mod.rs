pub mod market;
pub mod window;
