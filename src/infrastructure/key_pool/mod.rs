pub mod repository;
pub mod service;

pub use repository::InMemoryKeyPoolRepository;
pub use service::KeyPoolService;
