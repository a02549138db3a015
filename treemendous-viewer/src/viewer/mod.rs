pub mod app;
pub mod detailviewer;
pub mod model;
pub mod treeviewer;
pub mod ui;
#[allow(clippy::module_inception)]
pub mod viewer;
pub mod viewer_main;
