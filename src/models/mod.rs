pub mod employee;
pub mod industry;
