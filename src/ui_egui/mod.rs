mod app;
pub mod callbacks;

pub use app::CountdownApp;
pub use callbacks::AppCallbacks;
