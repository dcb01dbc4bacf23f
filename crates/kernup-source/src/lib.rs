mod html;
mod http;
mod site;

pub use html::{element_text_by_id, link_texts};
pub use http::{HttpSource, PageSource};
pub use site::{MainlineSite, DEFAULT_INDEX_URL, DEFAULT_MAINLINE_URL};
