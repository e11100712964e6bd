pub mod order;
pub mod ordering;
pub mod payment;
pub mod pricing;
pub mod theme;
