//! Server-rendered HTML pages.
//!
//! Uses Askama templates from the `templates/` directory.
//!
//! # Modules
//!
//! - [`script_redirect`] - Client-side redirect page for script redirect rules

pub mod script_redirect;

pub use script_redirect::ScriptRedirectPage;
