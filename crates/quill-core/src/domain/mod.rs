//! Domain entities - the core business objects.

mod category;
mod post;
mod user;

pub use category::Category;
pub use post::{Comment, Post};
pub use user::{Role, User};
