//! Static pages served by the contact form.

pub const INDEX_PAGE: &str = include_str!("../../static/index.html");

pub const SUCCESS_PAGE: &str = include_str!("../../static/success.html");
