pub mod area;
