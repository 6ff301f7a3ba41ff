//! Domain models.

pub mod blog;
pub mod blog_access;
pub mod role;
pub mod user;

pub use blog::{Blog, NewBlog};
pub use blog_access::BlogAccess;
pub use role::{GrantRole, PlatformRole, Role, UnknownRole};
pub use user::{NewUser, User};
