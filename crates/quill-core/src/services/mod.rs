//! Application services - the operations the API exposes, expressed over ports.

mod auth;
mod categories;
mod posts;

pub use auth::{AuthService, IssuedToken, NewAccount};
pub use categories::{CategoryService, NewCategory};
pub use posts::{
    AuthorRef, CategoryRef, ListPostsParams, NewComment, NewPost, Pagination, PopulatedPost,
    PostChanges, PostListing, PostService,
};

/// Largest page a client may request from a listing.
pub const MAX_PAGE_SIZE: u64 = 50;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
