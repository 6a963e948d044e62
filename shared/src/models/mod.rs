//! Data models for the POS cart core
//!
//! Cart aggregate plus the catalog read-model (products, categories,
//! specifications). All wire structs use camelCase field names to match the
//! store admin REST API.

pub mod cart;
pub mod category;
pub mod product;
pub mod specification;

pub use cart::{
    Cart, CartCustomer, CartDiscount, CartLineItem, CartNotes, CartPayment, CartStatus, CartTax,
    DiscountType, ProductSnapshot, SelectedColor, SelectedSpecification,
};
pub use category::Category;
pub use product::{Product, ProductColor, ProductSpecValue};
pub use specification::{Specification, SpecificationValue};
