//! Application services sitting between the TUI and the store.

pub mod bootstrap;
pub mod comment;
pub mod context;
pub mod task;

use crate::db::Store;

use self::comment::CommentService;
use self::context::ContextService;
use self::task::TaskService;

/// The service set the effect worker runs against.
#[derive(Debug, Clone)]
pub struct Services {
    pub tasks: TaskService<Store>,
    pub comments: CommentService<Store>,
    pub context: ContextService<Store>,
}

impl Services {
    pub fn new(store: Store) -> Self {
        Self {
            tasks: TaskService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            context: ContextService::new(store),
        }
    }
}
