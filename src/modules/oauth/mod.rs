pub mod avatar;
pub mod controller;
pub mod router;
pub mod service;

pub use avatar::{AvatarFetcher, HttpAvatarFetcher};
pub use router::init_oauth_router;
pub use service::OAuthService;
