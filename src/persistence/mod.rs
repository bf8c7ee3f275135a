pub mod files;
pub mod gateway;
pub mod kv;

pub use files::{
    atomic_write, config_file, ensure_dir, get_data_dir, init_local_dir, log_file, read_file,
};
pub use gateway::{TaskGateway, TASKS_KEY};
pub use kv::{DirStore, KeyValueStore, MemoryStore};
