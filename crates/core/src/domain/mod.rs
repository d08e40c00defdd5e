pub mod closet;
pub mod outfit;
pub mod weather;
