// Gallery — category catalog, page model over the preloader, and the download action.

pub mod catalog;
pub mod download;
pub mod view;
