//! Catalog records and their validated inputs.
//!
//! Each entity has three shapes:
//! - the stored record (`Product`, `BlogPost`, ...), as read back from the database
//! - a *draft* holding raw user input (admin forms, seed files)
//! - an *input* produced by `Draft::validate`, the only thing repositories accept
//!
//! Validation collects every problem at once so forms can show all field
//! errors together.

pub mod blog;
pub mod category;
pub mod certification;
pub mod image;
pub mod message;
pub mod order;
pub mod product;
pub mod user;
mod validation;

pub use blog::{BlogPost, BlogPostDraft, BlogPostInput};
pub use category::{Category, CategoryDraft, CategoryInput};
pub use certification::{Certification, CertificationDraft, CertificationInput};
pub use image::{Image, ImageError, ImageMeta, ImageUpload};
pub use message::{Message, MessageDraft, MessageInput};
pub use order::{Order, OrderDraft, OrderInput, OrderItem};
pub use product::{Product, ProductDraft, ProductInput, ProductSpec};
pub use user::{MIN_PASSWORD_LENGTH, User, UserDraft, UserInput};
pub use validation::{FieldError, ValidationErrors};
