//! Root crate facade for the TokenInout content server.

pub use tokeninout_core::{articles, frontmatter, mirror, site, store, text};
pub use tokeninout_server::{
    config, create_app, error, handlers, models, resolve_bind_address, serve_router, AppError,
    AppState, ArticleService, Config, ContentStore, GithubStore, LocalMirror, MemoryStore,
    DEFAULT_PORT,
};
