// Image source abstraction — the fetch primitive behind the preloader and downloads.

pub mod http_source;
pub mod traits;
