pub mod context;
pub mod order;
pub mod product;
