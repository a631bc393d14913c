mod product;
mod user;

pub use product::{NewProduct, Product, UpdateProduct};
pub use user::{NewUser, UpdateUser, User, UserProfile};
