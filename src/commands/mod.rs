pub mod helpers;
pub mod installations;
pub mod list;
pub mod models;
pub mod providers;
pub mod reset;
pub mod run;
pub mod select;
pub mod templates;
